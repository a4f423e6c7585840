#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use shelf_cache::{CacheError, CacheGeneration, CacheResult, CacheStorage, Catalog, MemoryStorage};
use shelf_core::{Request, Response, StatusCode, VersionTag, WorkerConfig};
use tokio::sync::Notify;
use shelf_worker::{FetchError, Network, Worker};
use url::Url;

pub fn scope() -> Url {
    Url::parse("https://stories.example/").unwrap()
}

pub fn url(path: &str) -> Url {
    scope().join(path).unwrap()
}

pub fn config(version: &str) -> WorkerConfig {
    WorkerConfig::new(VersionTag::new(version).unwrap(), scope())
}

/// Network double answering from a fixed table and counting calls.
#[derive(Default)]
pub struct ScriptedNetwork {
    routes: Mutex<HashMap<String, Result<Response, FetchError>>>,
    offline: Mutex<bool>,
    calls: AtomicUsize,
    seen: Mutex<Vec<String>>,
}

impl ScriptedNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve every catalog resource with a 200 whose body is its path.
    pub fn serving(catalog: &Catalog) -> Self {
        let network = Self::new();
        for entry in catalog.entries() {
            let url = catalog.resolve(&entry.path).unwrap();
            network.respond(url, Response::ok_with(entry.path.clone()));
        }
        network
    }

    pub fn respond(&self, url: Url, response: Response) {
        self.routes.lock().unwrap().insert(url.to_string(), Ok(response));
    }

    pub fn fail(&self, url: Url) {
        let error = FetchError::Connection {
            url: url.to_string(),
            reason: "connection reset".to_string(),
        };
        self.routes.lock().unwrap().insert(url.to_string(), Err(error));
    }

    pub fn set_offline(&self, offline: bool) {
        *self.offline.lock().unwrap() = offline;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Network for ScriptedNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let url = request.url().to_string();
        self.seen.lock().unwrap().push(url.clone());

        if *self.offline.lock().unwrap() {
            return Err(FetchError::Offline { url });
        }
        match self.routes.lock().unwrap().get(&url) {
            Some(outcome) => outcome.clone(),
            None => Ok(Response::new(StatusCode::NOT_FOUND, "Not Found")),
        }
    }
}

/// Storage whose deletes fail for selected generation names.
pub struct FlakyDeletes {
    inner: MemoryStorage,
    failing: HashSet<String>,
}

impl FlakyDeletes {
    pub fn new(failing: &[&str]) -> Self {
        Self {
            inner: MemoryStorage::new(),
            failing: failing.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[async_trait]
impl CacheStorage for FlakyDeletes {
    async fn open(&self, name: &str) -> CacheResult<Arc<dyn CacheGeneration>> {
        self.inner.open(name).await
    }

    async fn get(&self, name: &str) -> CacheResult<Option<Arc<dyn CacheGeneration>>> {
        self.inner.get(name).await
    }

    async fn has(&self, name: &str) -> CacheResult<bool> {
        self.inner.has(name).await
    }

    async fn delete(&self, name: &str) -> CacheResult<bool> {
        if self.failing.contains(name) {
            return Err(CacheError::Storage(format!("{name} is locked")));
        }
        self.inner.delete(name).await
    }

    async fn keys(&self) -> CacheResult<Vec<String>> {
        self.inner.keys().await
    }
}

/// Storage whose entry writes wait until the gate is opened.
pub struct GatedPuts {
    pub inner: MemoryStorage,
    gate: Arc<Notify>,
    puts: Arc<AtomicUsize>,
}

impl GatedPuts {
    pub fn new() -> Self {
        Self {
            inner: MemoryStorage::new(),
            gate: Arc::new(Notify::new()),
            puts: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Let one pending or future write through.
    pub fn release(&self) {
        self.gate.notify_one();
    }

    /// Writes that completed.
    pub fn puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    fn wrap(&self, inner: Arc<dyn CacheGeneration>) -> Arc<dyn CacheGeneration> {
        Arc::new(GatedGeneration {
            inner,
            gate: self.gate.clone(),
            puts: self.puts.clone(),
        })
    }
}

struct GatedGeneration {
    inner: Arc<dyn CacheGeneration>,
    gate: Arc<Notify>,
    puts: Arc<AtomicUsize>,
}

#[async_trait]
impl CacheGeneration for GatedGeneration {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn match_request(&self, request: &Request) -> CacheResult<Option<Response>> {
        self.inner.match_request(request).await
    }

    async fn put(&self, request: &Request, response: Response) -> CacheResult<()> {
        self.gate.notified().await;
        self.inner.put(request, response).await?;
        self.puts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn delete(&self, request: &Request) -> CacheResult<bool> {
        self.inner.delete(request).await
    }

    async fn keys(&self) -> CacheResult<Vec<String>> {
        self.inner.keys().await
    }
}

#[async_trait]
impl CacheStorage for GatedPuts {
    async fn open(&self, name: &str) -> CacheResult<Arc<dyn CacheGeneration>> {
        Ok(self.wrap(self.inner.open(name).await?))
    }

    async fn get(&self, name: &str) -> CacheResult<Option<Arc<dyn CacheGeneration>>> {
        Ok(self.inner.get(name).await?.map(|g| self.wrap(g)))
    }

    async fn has(&self, name: &str) -> CacheResult<bool> {
        self.inner.has(name).await
    }

    async fn delete(&self, name: &str) -> CacheResult<bool> {
        self.inner.delete(name).await
    }

    async fn keys(&self) -> CacheResult<Vec<String>> {
        self.inner.keys().await
    }
}

pub fn worker(
    version: &str,
    storage: Arc<dyn CacheStorage>,
    network: Arc<dyn Network>,
) -> Worker {
    Worker::new(config(version), storage, network)
}
