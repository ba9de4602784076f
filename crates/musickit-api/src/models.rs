//! Response models for the Apple Music API
//!
//! Only the attributes the CLI consumes are modeled; everything else in
//! the responses is ignored. Field names follow the API's camelCase.

use serde::Deserialize;

/// One page of a paged collection.
///
/// `next` is a path (not a full URL) pointing at the next page, present
/// only when more data remains.
#[derive(Debug, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub next: Option<String>,
}

/// A library playlist.
#[derive(Debug, Clone, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub attributes: Option<PlaylistAttributes>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistAttributes {
    pub name: Option<String>,
    pub date_added: Option<String>,
}

/// A track within a library playlist.
#[derive(Debug, Clone, Deserialize)]
pub struct Track {
    pub id: String,
    pub attributes: Option<TrackAttributes>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackAttributes {
    pub name: Option<String>,
    pub artist_name: Option<String>,
    pub album_name: Option<String>,
    #[serde(default)]
    pub genre_names: Vec<String>,
    pub release_date: Option<String>,
}
