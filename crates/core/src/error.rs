//! Unified error types for precache.
//!
//! Strategy code recovers from most of these locally (cache fallback or a
//! synthetic offline response); they surface to callers only from lifecycle
//! operations and configuration loading.

use tokio_rusqlite::rusqlite;

/// Unified error type for the precache workspace.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Store database operation failed.
    #[error("store error: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("store error: migration failed: {0}")]
    MigrationFailed(String),

    /// Invalid or unsupported URL.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// Network-level fetch failure (connect, TLS, read).
    #[error("network error: {0}")]
    Network(String),

    /// Fetch did not complete within the configured timeout.
    #[error("fetch timeout: {0}")]
    FetchTimeout(String),

    /// Response body exceeded the configured size limit.
    #[error("response too large: {0}")]
    FetchTooLarge(String),

    /// Non-2xx HTTP status. Strategies treat this the same as a network
    /// failure: fall back to cache or the synthetic offline response.
    #[error("http status {0}")]
    HttpStatus(u16),

    /// Worker is in the wrong lifecycle state for the operation.
    #[error("invalid worker state: expected {expected}, got {actual}")]
    InvalidState { expected: String, actual: String },
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}
