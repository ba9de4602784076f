//! Error types for Apple Music API calls

/// Errors from catalog and library API operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Apple Music API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("invalid response body: {0}")]
    Decode(String),

    #[error("no Music user token is set — authorize first")]
    MissingUserToken,

    #[error("not found: {0}")]
    NotFound(String),
}

impl Error {
    /// Map a non-success status to the message the CLI shows the user.
    pub(crate) fn from_status(status: u16, body: String) -> Self {
        let message = match status {
            401 => "Unauthorized: incorrect Authorization header or token expired".into(),
            403 => "Forbidden: invalid or insufficient authentication".into(),
            429 => "Too Many Requests: rate limited by Apple servers".into(),
            500..=599 => "Internal Server Error: an error occurred on the server".into(),
            _ => body,
        };
        Error::Api { status, message }
    }
}

/// Result alias for API operations.
pub type Result<T> = std::result::Result<T, Error>;
