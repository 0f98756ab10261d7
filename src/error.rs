//! Error types for skywatch

use thiserror::Error;

/// Main error type for skywatch operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Quota store error: {0}")]
    QuotaStore(String),

    #[error("Upstream error: {0}")]
    Upstream(String),
}

impl From<redis::RedisError> for Error {
    fn from(err: redis::RedisError) -> Self {
        Error::QuotaStore(err.to_string())
    }
}

/// Result type alias for skywatch operations
pub type Result<T> = std::result::Result<T, Error>;
