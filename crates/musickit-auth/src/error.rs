//! Error types for the authentication subsystem

use std::time::Duration;

/// Errors from developer token signing, user token storage, and the
/// interactive authorization flow.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid team id: expected exactly 10 characters, got {0}")]
    InvalidTeamId(usize),

    #[error("invalid key id: expected exactly 10 characters, got {0}")]
    InvalidKeyId(usize),

    #[error("cannot read private key: {0}")]
    KeyUnreadable(String),

    #[error("private key is not a usable ES256 key: {0}")]
    KeyInvalid(String),

    #[error("cannot read stored user token: {0}")]
    StorageUnreadable(String),

    #[error("cannot persist user token: {0}")]
    StorageUnwritable(String),

    #[error("consent page template missing: {0}")]
    PageTemplateMissing(String),

    #[error("callback server failed to start: {0}")]
    ServerStart(String),

    #[error("authorization was not completed within {}s — run the command again to retry", .0.as_secs())]
    Timeout(Duration),
}

/// Result alias for auth operations.
pub type Result<T> = std::result::Result<T, Error>;
