//! Cache errors.

use thiserror::Error;

/// Cache error types.
///
/// A missing key is never an error; providers report it as `Ok(None)`.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Backend failure (connection, permissions, corrupt entry).
    #[error("Cache backend error: {0}")]
    Backend(String),

    /// Value could not be encoded into or decoded from the cache.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        CacheError::Serialization(err.to_string())
    }
}
