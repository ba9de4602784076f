//! Configuration loading
//!
//! Precedence: env vars > config file > defaults. A `.env` file is
//! autoloaded by main before this runs. The private key itself never
//! appears in configuration, only its path.

use std::path::{Path, PathBuf};

use common::{Error, Result};
use musickit_auth::DeveloperCredentials;
use serde::Deserialize;

/// Root configuration
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub credentials: CredentialsConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

/// Developer credential settings (env vars: APPLE_MUSIC_TEAM_ID,
/// APPLE_MUSIC_KEY_ID, APPLE_MUSIC_PRIVATE_KEY_PATH)
#[derive(Debug, Default, Deserialize)]
pub struct CredentialsConfig {
    #[serde(default)]
    pub team_id: Option<String>,
    #[serde(default)]
    pub key_id: Option<String>,
    #[serde(default)]
    pub private_key_path: Option<PathBuf>,
}

/// Authorization flow and catalog settings
#[derive(Debug, Deserialize)]
pub struct AuthConfig {
    /// Consent page template served at /login during authorization.
    #[serde(default = "default_consent_page")]
    pub consent_page: PathBuf,
    /// Storefront for catalog lookups.
    #[serde(default = "default_storefront")]
    pub storefront: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            consent_page: default_consent_page(),
            storefront: default_storefront(),
        }
    }
}

fn default_consent_page() -> PathBuf {
    PathBuf::from("assets/login.html")
}

fn default_storefront() -> String {
    "us".into()
}

impl Config {
    /// Load configuration from an optional TOML file, then overlay
    /// environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => {
                let contents = std::fs::read_to_string(p)?;
                toml::from_str::<Config>(&contents)?
            }
            None => Config::default(),
        };

        if let Ok(v) = std::env::var("APPLE_MUSIC_TEAM_ID") {
            config.credentials.team_id = Some(v);
        }
        if let Ok(v) = std::env::var("APPLE_MUSIC_KEY_ID") {
            config.credentials.key_id = Some(v);
        }
        if let Ok(v) = std::env::var("APPLE_MUSIC_PRIVATE_KEY_PATH") {
            config.credentials.private_key_path = Some(PathBuf::from(v));
        }
        if let Ok(v) = std::env::var("APPLE_MUSIC_CONSENT_PAGE") {
            config.auth.consent_page = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("APPLE_MUSIC_STOREFRONT") {
            config.auth.storefront = v;
        }

        Ok(config)
    }

    /// Resolve the config file path from the CLI arg or the
    /// APPLE_MUSIC_CONFIG env var; fall back to ./apple-music-cli.toml
    /// when that file exists.
    pub fn resolve_path(cli_path: Option<&Path>) -> Option<PathBuf> {
        if let Some(p) = cli_path {
            return Some(p.to_owned());
        }
        if let Ok(p) = std::env::var("APPLE_MUSIC_CONFIG") {
            return Some(PathBuf::from(p));
        }
        let default = PathBuf::from("apple-music-cli.toml");
        default.exists().then_some(default)
    }

    /// Build the credential triple, failing with a message naming the
    /// missing setting and its environment variable.
    pub fn developer_credentials(&self) -> Result<DeveloperCredentials> {
        let team_id = self
            .credentials
            .team_id
            .clone()
            .ok_or_else(|| missing("team_id", "APPLE_MUSIC_TEAM_ID"))?;
        let key_id = self
            .credentials
            .key_id
            .clone()
            .ok_or_else(|| missing("key_id", "APPLE_MUSIC_KEY_ID"))?;
        let private_key_path = self
            .credentials
            .private_key_path
            .clone()
            .ok_or_else(|| missing("private_key_path", "APPLE_MUSIC_PRIVATE_KEY_PATH"))?;
        Ok(DeveloperCredentials::new(team_id, key_id, private_key_path))
    }
}

fn missing(field: &str, var: &str) -> Error {
    Error::Config(format!(
        "missing Apple Music credential `{field}`: set it in the config file or via {var}"
    ))
}
