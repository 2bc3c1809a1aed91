use thiserror::Error;

/// Subtext's crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Subtext's crate-wide error type.
///
/// Every request terminates in exactly one of these variants. The first three
/// carry a description that is safe to show to clients; `Internal` wraps the
/// underlying cause for logging and reporting, and callers are expected to
/// substitute a generic message before it reaches the wire.
#[derive(Debug, Error)]
pub enum Error {
    /// The client's input was malformed (missing URL, unknown output format,
    /// unresolvable video URL).
    #[error("{0}")]
    BadRequest(String),

    /// The input was valid but no transcript exists or captions are disabled.
    #[error("{0}")]
    NotFound(String),

    /// The client exceeded its request quota. The message is the violated
    /// limit in human form (e.g. `10 per 1 minute`).
    #[error("{0}")]
    RateLimited(String),

    /// Anything unexpected: network failure, unexpected response shape,
    /// serialization failure.
    #[error("{0}")]
    Internal(anyhow::Error),
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

impl Error {
    pub(crate) fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub(crate) fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(err.into())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(err.into())
    }
}
