//! Outbound network seam.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use shelf_core::{Request, Response, StatusCode};
use tracing::debug;
use url::Url;

use crate::error::FetchError;

/// Outbound fetch used by the worker.
#[async_trait]
pub trait Network: Send + Sync {
    /// Fetch a request. Non-OK statuses are returned as responses.
    async fn fetch(&self, request: &Request) -> Result<Response, FetchError>;
}

/// A network that is never reachable.
#[derive(Debug, Clone, Copy, Default)]
pub struct Offline;

#[async_trait]
impl Network for Offline {
    async fn fetch(&self, request: &Request) -> Result<Response, FetchError> {
        Err(FetchError::Offline {
            url: request.url().to_string(),
        })
    }
}

/// Serves requests under an app scope from a local site directory.
///
/// Missing files answer 404. Requests outside the scope fail with a
/// connection error, as there is no route to other origins.
#[derive(Debug, Clone)]
pub struct SiteDirectory {
    scope: Url,
    root: PathBuf,
}

impl SiteDirectory {
    /// Create a site directory network.
    pub fn new(scope: Url, root: impl Into<PathBuf>) -> Self {
        Self {
            scope,
            root: root.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a URL to a file under the root.
    fn file_for(&self, url: &Url) -> Option<PathBuf> {
        if url.origin() != self.scope.origin() {
            return None;
        }
        let relative = url.path().strip_prefix(self.scope.path())?;

        let mut path = self.root.clone();
        for segment in relative.split('/').filter(|s| !s.is_empty()) {
            if segment == ".." {
                return None;
            }
            path.push(segment);
        }
        if relative.is_empty() || relative.ends_with('/') {
            path.push("index.html");
        }
        Some(path)
    }
}

#[async_trait]
impl Network for SiteDirectory {
    async fn fetch(&self, request: &Request) -> Result<Response, FetchError> {
        let url = request.url();
        let Some(path) = self.file_for(url) else {
            return Err(FetchError::Connection {
                url: url.to_string(),
                reason: "no route to host".to_string(),
            });
        };

        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                debug!(url = %url, path = %path.display(), "served from site directory");
                Ok(Response::ok_with(bytes).with_header("Content-Type", content_type_for(&path)))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(Response::new(StatusCode::NOT_FOUND, "Not Found"))
            }
            Err(e) => Err(FetchError::Connection {
                url: url.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}

fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") => "text/html; charset=utf-8",
        Some("css") => "text/css",
        Some("js") => "text/javascript",
        Some("json") => "application/json",
        Some("webmanifest") => "application/manifest+json",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}
