//! apple-music-cli: browse and export your Apple Music library.

mod config;
mod output;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::warn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use musickit_api::{MusicClient, Playlist};
use musickit_auth::{AuthFlowOptions, ConsentPage, TokenStore, obtain_user_token};

use crate::config::Config;
use crate::output::{DEFAULT_CSV_OUTPUT, DEFAULT_JSON_OUTPUT, song_records};

/// Known-good catalog song used by the `test` command ("Born in the
/// U.S.A.").
const TEST_SONG_ID: &str = "203709340";

#[derive(Parser)]
#[command(name = "apple-music-cli", about = "Apple Music library CLI", version)]
struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Verify credentials by fetching a known catalog song.
    Test,
    /// List library playlists.
    Playlists,
    /// Show one library playlist.
    Playlist {
        /// Playlist id (e.g. p.abc123).
        id: String,
    },
    /// Export the tracks of a playlist to a file.
    Export {
        /// Playlist id to export.
        id: String,
        /// Output format.
        #[arg(short, long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,
        /// Output path (defaults per format under ./output/).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Copy, Clone, ValueEnum)]
enum ExportFormat {
    Json,
    Csv,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_new("info"))
                .unwrap_or_default(),
        )
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();
    let config_path = Config::resolve_path(cli.config.as_deref());
    let config = Config::load(config_path.as_deref())?;

    match cli.command {
        Command::Test => run_test(&config).await,
        Command::Playlists => run_playlists(&config).await,
        Command::Playlist { id } => run_playlist(&config, &id).await,
        Command::Export { id, format, output } => run_export(&config, &id, format, output).await,
    }
}

async fn run_test(config: &Config) -> anyhow::Result<()> {
    let client = developer_client(config)?;
    let song = client
        .catalog_song(&config.auth.storefront, TEST_SONG_ID)
        .await
        .context("credential test failed")?;
    let name = song["data"][0]["attributes"]["name"]
        .as_str()
        .unwrap_or("<unknown>");
    println!("Credentials OK: fetched \"{name}\" from the {} catalog", config.auth.storefront);
    Ok(())
}

async fn run_playlists(config: &Config) -> anyhow::Result<()> {
    let client = authorized_client(config).await?;
    let playlists = client.library_playlists().await?;
    if playlists.is_empty() {
        println!("No playlists in your library.");
        return Ok(());
    }
    for playlist in &playlists {
        print_playlist(playlist);
    }
    Ok(())
}

async fn run_playlist(config: &Config, id: &str) -> anyhow::Result<()> {
    let client = authorized_client(config).await?;
    let playlist = client.library_playlist(id).await?;
    print_playlist(&playlist);

    let tracks = client.playlist_tracks(id).await?;
    for track in &tracks {
        let name = track
            .attributes
            .as_ref()
            .and_then(|a| a.name.as_deref())
            .unwrap_or("<untitled>");
        println!("  {name}");
    }
    println!("{} tracks", tracks.len());
    Ok(())
}

async fn run_export(
    config: &Config,
    id: &str,
    format: ExportFormat,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let client = authorized_client(config).await?;
    let tracks = client.playlist_tracks(id).await?;
    let records = song_records(&tracks);

    let path = output.unwrap_or_else(|| {
        PathBuf::from(match format {
            ExportFormat::Json => DEFAULT_JSON_OUTPUT,
            ExportFormat::Csv => DEFAULT_CSV_OUTPUT,
        })
    });
    match format {
        ExportFormat::Json => output::write_json(&records, &path)?,
        ExportFormat::Csv => output::write_csv(&records, &path)?,
    }
    println!("Exported {} songs to {}", records.len(), path.display());
    Ok(())
}

/// Client that can call catalog endpoints (developer token only).
fn developer_client(config: &Config) -> anyhow::Result<MusicClient> {
    let credentials = config.developer_credentials()?;
    let token = musickit_auth::developer_token::sign(&credentials)?;
    Ok(MusicClient::new(token))
}

/// Client that can call library endpoints, acquiring a Music user token
/// interactively when none is stored.
async fn authorized_client(config: &Config) -> anyhow::Result<MusicClient> {
    let credentials = Arc::new(config.developer_credentials()?);
    let developer_token = musickit_auth::developer_token::sign(&credentials)?;

    let store = Arc::new(TokenStore::from_platform_dirs()?);
    let user_token = match store.read().await? {
        Some(token) => token,
        None => {
            let page = ConsentPage::load(&config.auth.consent_page)?;
            let token =
                obtain_user_token(credentials, store, page, AuthFlowOptions::default()).await?;
            println!("{token}");
            token
        }
    };

    Ok(MusicClient::new(developer_token).with_user_token(user_token))
}

fn print_playlist(playlist: &Playlist) {
    let (name, date_added) = playlist
        .attributes
        .as_ref()
        .map(|a| (a.name.as_deref(), a.date_added.as_deref()))
        .unwrap_or((None, None));

    let added = date_added.map(format_date).unwrap_or_default();
    println!(
        "{}  {}  {}",
        playlist.id,
        name.unwrap_or("<untitled>"),
        added
    );
}

/// Render an RFC 3339 timestamp as DD-MM-YYYY, passing unparseable
/// values through unchanged.
fn format_date(raw: &str) -> String {
    match chrono::DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => dt.format("%d-%m-%Y").to_string(),
        Err(e) => {
            warn!(value = raw, error = %e, "unparseable dateAdded");
            raw.to_owned()
        }
    }
}
