//! Apple Music API client
//!
//! Thin reqwest wrapper over the catalog and library endpoints the CLI
//! uses. Catalog calls carry only the developer token as a Bearer
//! credential; library calls additionally send the Music-User-Token
//! header obtained from the authorization flow.

use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::models::{Page, Playlist, Track};

/// Production API host.
pub const DEFAULT_BASE_URL: &str = "https://api.music.apple.com";

const MUSIC_USER_TOKEN_HEADER: &str = "Music-User-Token";

/// Client for the Apple Music catalog and library endpoints.
#[derive(Debug, Clone)]
pub struct MusicClient {
    http: reqwest::Client,
    base_url: String,
    developer_token: String,
    user_token: Option<String>,
}

impl MusicClient {
    pub fn new(developer_token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            developer_token: developer_token.into(),
            user_token: None,
        }
    }

    /// Point the client at a different host (used by tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Attach the Music user token required by library endpoints.
    pub fn with_user_token(mut self, token: impl Into<String>) -> Self {
        self.user_token = Some(token.into());
        self
    }

    fn ensure_user_token(&self) -> Result<()> {
        if self.user_token.is_none() {
            return Err(Error::MissingUserToken);
        }
        Ok(())
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{path}", self.base_url);
        let mut request = self.http.get(&url).bearer_auth(&self.developer_token);
        if let Some(token) = &self.user_token {
            request = request.header(MUSIC_USER_TOKEN_HEADER, token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Http(format!("GET {url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<no body>"));
            return Err(Error::from_status(status.as_u16(), body));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| Error::Decode(e.to_string()))
    }

    /// Look up one catalog song by storefront and id.
    ///
    /// Needs only the developer token, so it doubles as a credential
    /// smoke test (the CLI `test` command).
    pub async fn catalog_song(&self, storefront: &str, id: &str) -> Result<serde_json::Value> {
        self.get_json(&format!("/v1/catalog/{storefront}/songs/{id}"))
            .await
    }

    /// All library playlists for the authenticated user.
    pub async fn library_playlists(&self) -> Result<Vec<Playlist>> {
        self.ensure_user_token()?;
        let page: Page<Playlist> = self.get_json("/v1/me/library/playlists").await?;
        info!(playlists = page.data.len(), "fetched library playlists");
        Ok(page.data)
    }

    /// One library playlist by id.
    pub async fn library_playlist(&self, id: &str) -> Result<Playlist> {
        self.ensure_user_token()?;
        let page: Page<Playlist> = self
            .get_json(&format!("/v1/me/library/playlists/{id}"))
            .await?;
        page.data
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound(format!("playlist {id}")))
    }

    /// All tracks of a library playlist, following the `next` paging
    /// cursor until exhausted.
    pub async fn playlist_tracks(&self, id: &str) -> Result<Vec<Track>> {
        self.ensure_user_token()?;

        let mut tracks = Vec::new();
        let mut path = format!("/v1/me/library/playlists/{id}/tracks");
        loop {
            let page: Page<Track> = self.get_json(&path).await?;
            debug!(fetched = page.data.len(), "fetched tracks page");
            tracks.extend(page.data);
            match page.next {
                Some(next) => path = next,
                None => break,
            }
        }

        info!(playlist = id, total = tracks.len(), "fetched playlist tracks");
        Ok(tracks)
    }
}
