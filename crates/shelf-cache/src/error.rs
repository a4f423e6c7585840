//! Cache error types.

use std::path::PathBuf;

use shelf_core::Method;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Errors that can occur when using cache storage.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Only GET requests can be stored.
    #[error("cannot cache {0} requests")]
    UnsupportedMethod(Method),

    /// Failed to serialize/deserialize a stored entry.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem error in a disk-backed store.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The generation was deleted while still in use.
    #[error("cache generation '{0}' no longer exists")]
    Deleted(String),

    /// A stored entry could not be decoded.
    #[error("corrupt cache entry: {0}")]
    Corrupt(String),

    /// Backend storage error.
    #[error("storage error: {0}")]
    Storage(String),
}

impl CacheError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
