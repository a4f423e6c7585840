//! Worker error types.

use std::time::Duration;

use shelf_cache::CacheError;
use shelf_core::StatusCode;

/// Error type for outbound network fetches.
///
/// A response with a non-OK status is not an error at this layer.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    #[error("connection error for {url}: {reason}")]
    Connection { url: String, reason: String },

    #[error("network unreachable: {url}")]
    Offline { url: String },

    #[error("timed out fetching {url}")]
    Timeout { url: String },
}

/// Why a single resource could not be precached.
#[derive(Debug, thiserror::Error)]
pub enum PrecacheError {
    #[error("invalid resource path: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error(transparent)]
    Network(#[from] FetchError),

    #[error("bad response status {0}")]
    Status(StatusCode),

    #[error("store failed: {0}")]
    Store(#[from] CacheError),

    #[error("no response within {0:?}")]
    Timeout(Duration),
}

/// Install failed before any resource could be precached.
#[derive(Debug, thiserror::Error)]
pub enum InstallError {
    #[error("failed to open static generation '{name}': {source}")]
    OpenGeneration {
        name: String,
        #[source]
        source: CacheError,
    },
}

/// A request could not be answered from cache, network or fallback.
#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error("fetch failed for {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: FetchError,
    },
}
