//! Apple Music API client library
//!
//! Consumes the credentials produced by `musickit-auth` (developer
//! token + Music user token) and exposes the handful of catalog and
//! library endpoints the CLI needs. Pagination and status-code mapping
//! live here; no token logic does.

pub mod client;
pub mod error;
pub mod models;

pub use client::{DEFAULT_BASE_URL, MusicClient};
pub use error::{Error, Result};
pub use models::{Page, Playlist, PlaylistAttributes, Track, TrackAttributes};
