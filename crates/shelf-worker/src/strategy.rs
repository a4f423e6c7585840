//! Fetch handler: choose cache-first or network-first per request.

use shelf_cache::current_dynamic_name;
use shelf_core::{Method, Request, Response, StatusCode};
use tracing::{debug, warn};

use crate::error::{FetchError, ServeError};
use crate::fallback::Fallback;
use crate::worker::Worker;

/// Where a served response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    /// A cache generation.
    Cache,
    /// The network.
    Network,
    /// A cached fallback resource.
    Fallback(Fallback),
}

impl std::fmt::Display for ResponseSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cache => write!(f, "cache"),
            Self::Network => write!(f, "network"),
            Self::Fallback(Fallback::ShellDocument) => write!(f, "fallback (shell)"),
            Self::Fallback(Fallback::PlaceholderImage) => write!(f, "fallback (placeholder)"),
            Self::Fallback(Fallback::None) => write!(f, "fallback"),
        }
    }
}

/// A response together with its source.
#[derive(Debug, Clone)]
pub struct Served {
    pub response: Response,
    pub source: ResponseSource,
}

impl Served {
    fn new(response: Response, source: ResponseSource) -> Self {
        Self { response, source }
    }
}

impl Worker {
    /// Fetch handler.
    ///
    /// Catalog resources are served cache-first. Everything else is looked up
    /// in every generation, then fetched; a `200` response is copied into the
    /// dynamic generation in the background. Network failures fall back to the
    /// cached shell or placeholder depending on the request.
    pub async fn handle_fetch(&self, request: &Request) -> Result<Served, ServeError> {
        if *request.method() != Method::GET {
            debug!(request = %request, "not intercepted");
            return self.from_network(request).await;
        }

        if self.catalog().is_precached_url(request.url()) {
            self.serve_precached(request).await
        } else {
            self.serve_runtime(request).await
        }
    }

    async fn serve_precached(&self, request: &Request) -> Result<Served, ServeError> {
        if let Some(response) = self.lookup(request).await {
            debug!(request = %request, "precached hit");
            return Ok(Served::new(response, ResponseSource::Cache));
        }

        match self.network.fetch(request).await {
            Ok(response) => {
                debug!(request = %request, status = %response.status(), "precached miss served from network");
                Ok(Served::new(response, ResponseSource::Network))
            }
            Err(e) => self.fall_back(request, Fallback::for_precached(request), e).await,
        }
    }

    async fn serve_runtime(&self, request: &Request) -> Result<Served, ServeError> {
        if let Some(response) = self.lookup(request).await {
            debug!(request = %request, "runtime hit");
            return Ok(Served::new(response, ResponseSource::Cache));
        }

        match self.network.fetch(request).await {
            Ok(response) => {
                debug!(request = %request, status = %response.status(), "runtime fetch");
                if response.status() == StatusCode::OK {
                    self.store_dynamic(request, &response);
                }
                Ok(Served::new(response, ResponseSource::Network))
            }
            Err(e) => self.fall_back(request, Fallback::for_runtime(request), e).await,
        }
    }

    async fn from_network(&self, request: &Request) -> Result<Served, ServeError> {
        self.network
            .fetch(request)
            .await
            .map(|response| Served::new(response, ResponseSource::Network))
            .map_err(|source| ServeError::Network {
                url: request.url().to_string(),
                source,
            })
    }

    /// Cache lookup across all generations; errors count as a miss.
    async fn lookup(&self, request: &Request) -> Option<Response> {
        match self.storage.match_any(request).await {
            Ok(found) => found,
            Err(e) => {
                warn!(request = %request, error = %e, "cache lookup failed");
                None
            }
        }
    }

    async fn fall_back(
        &self,
        request: &Request,
        fallback: Fallback,
        error: FetchError,
    ) -> Result<Served, ServeError> {
        let failed = || ServeError::Network {
            url: request.url().to_string(),
            source: error.clone(),
        };

        let Some(path) = fallback.path() else {
            debug!(request = %request, error = %error, "no fallback");
            return Err(failed());
        };
        let Ok(url) = self.catalog().resolve(path) else {
            return Err(failed());
        };

        match self.lookup(&Request::get(url)).await {
            Some(response) => {
                debug!(request = %request, fallback = path, "served fallback");
                Ok(Served::new(response, ResponseSource::Fallback(fallback)))
            }
            None => {
                warn!(request = %request, fallback = path, "fallback not cached");
                Err(failed())
            }
        }
    }

    /// Copy a response into the dynamic generation without blocking the
    /// caller.
    fn store_dynamic(&self, request: &Request, response: &Response) {
        if self.is_retired() {
            debug!(request = %request, "retired worker; runtime response not stored");
            return;
        }
        let storage = self.storage.clone();
        let retired = self.retired_flag();
        let name = current_dynamic_name(self.version());
        let request = request.clone();
        let response = response.clone();

        let task = tokio::spawn(async move {
            if retired.load(std::sync::atomic::Ordering::Acquire) {
                return;
            }
            let stored = match storage.open(&name).await {
                Ok(generation) => generation.put(&request, response).await,
                Err(e) => Err(e),
            };
            match stored {
                Ok(()) => debug!(generation = %name, request = %request, "stored runtime response"),
                Err(e) => warn!(generation = %name, request = %request, error = %e, "runtime cache write failed"),
            }
        });
        self.extend_lifetime(task);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use shelf_cache::{CacheStorage, Catalog, MemoryStorage, ResourceEntry, ResourceRole};
    use shelf_core::{VersionTag, WorkerConfig};
    use url::Url;

    use crate::network::Offline;

    fn scope() -> Url {
        Url::parse("https://stories.example/").unwrap()
    }

    fn offline_worker(storage: Arc<MemoryStorage>) -> Worker {
        let config = WorkerConfig::new(VersionTag::new("v1").unwrap(), scope());
        let catalog = Catalog::new(
            scope(),
            vec![
                ResourceEntry::new("./index.html", ResourceRole::Shell),
                ResourceEntry::new("./assets/images/placeholder.svg", ResourceRole::Image),
            ],
        );
        Worker::new(config, storage, Arc::new(Offline)).with_catalog(catalog)
    }

    #[tokio::test]
    async fn test_offline_without_fallback_cached() {
        let worker = offline_worker(Arc::new(MemoryStorage::new()));
        let request = Request::navigate(scope().join("about").unwrap());

        let err = worker.handle_fetch(&request).await.unwrap_err();
        assert!(matches!(
            err,
            ServeError::Network {
                source: FetchError::Offline { .. },
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_other_requests_propagate_failure() {
        let storage = Arc::new(MemoryStorage::new());
        let generation = storage.open("static-v1").await.unwrap();
        let shell = Request::get(scope().join("index.html").unwrap());
        generation
            .put(&shell, Response::ok_with("<html>shell</html>"))
            .await
            .unwrap();

        let worker = offline_worker(storage);
        let request = Request::get(scope().join("api/feed.json").unwrap());
        assert!(worker.handle_fetch(&request).await.is_err());
    }

    #[tokio::test]
    async fn test_non_get_bypasses_cache() {
        let storage = Arc::new(MemoryStorage::new());
        let generation = storage.open("static-v1").await.unwrap();
        let shell = Request::get(scope().join("index.html").unwrap());
        generation
            .put(&shell, Response::new(StatusCode::OK, "cached"))
            .await
            .unwrap();

        let worker = offline_worker(storage);
        let post = Request::get(scope().join("index.html").unwrap()).with_method(Method::POST);
        assert!(worker.handle_fetch(&post).await.is_err());
    }

    #[tokio::test]
    async fn test_retired_worker_does_not_write_through() {
        let storage = Arc::new(MemoryStorage::new());
        let worker = offline_worker(storage.clone());
        worker.retire();

        let request = Request::get(scope().join("api/feed.json").unwrap());
        worker.store_dynamic(&request, &Response::ok_with("{}"));
        worker.settle().await;

        assert!(storage.keys().await.unwrap().is_empty());
    }

    #[test]
    fn test_source_display() {
        assert_eq!(ResponseSource::Cache.to_string(), "cache");
        assert_eq!(
            ResponseSource::Fallback(Fallback::PlaceholderImage).to_string(),
            "fallback (placeholder)"
        );
    }
}
