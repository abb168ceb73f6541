//! Error types for session store operations

/// Errors from session store operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("session backend unavailable: {0}")]
    Backend(String),

    #[error("invalid session id: {0}")]
    InvalidId(String),
}

/// Result alias for session operations.
pub type Result<T> = std::result::Result<T, Error>;
