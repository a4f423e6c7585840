//! Cache storage traits.

use std::sync::Arc;

use async_trait::async_trait;
use shelf_core::{Request, Response};

use crate::error::CacheResult;

/// One named request/response store.
///
/// Entries are keyed by request identity (method plus URL). Only GET requests
/// are stored; `put` is last-write-wins.
#[async_trait]
pub trait CacheGeneration: Send + Sync {
    /// Generation name.
    fn name(&self) -> &str;

    /// Look up the response stored for a request.
    async fn match_request(&self, request: &Request) -> CacheResult<Option<Response>>;

    /// Store a response for a request, replacing any previous entry.
    async fn put(&self, request: &Request, response: Response) -> CacheResult<()>;

    /// Remove the entry for a request.
    async fn delete(&self, request: &Request) -> CacheResult<bool>;

    /// Request keys of all entries, oldest first.
    async fn keys(&self) -> CacheResult<Vec<String>>;
}

/// The set of named generations for an origin.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Open a generation, creating it if absent.
    async fn open(&self, name: &str) -> CacheResult<Arc<dyn CacheGeneration>>;

    /// Get an existing generation. Never creates one.
    async fn get(&self, name: &str) -> CacheResult<Option<Arc<dyn CacheGeneration>>>;

    /// Check whether a generation exists.
    async fn has(&self, name: &str) -> CacheResult<bool>;

    /// Delete a generation and all of its entries.
    async fn delete(&self, name: &str) -> CacheResult<bool>;

    /// Names of all generations, in creation order.
    async fn keys(&self) -> CacheResult<Vec<String>>;

    /// Look up a request across every generation, in creation order.
    ///
    /// Generations deleted after the names were listed are skipped.
    async fn match_any(&self, request: &Request) -> CacheResult<Option<Response>> {
        for name in self.keys().await? {
            let Some(generation) = self.get(&name).await? else {
                continue;
            };
            if let Some(response) = generation.match_request(request).await? {
                return Ok(Some(response));
            }
        }
        Ok(None)
    }
}
