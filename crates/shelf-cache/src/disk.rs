//! Disk-backed cache storage.
//!
//! Layout under the root directory:
//!
//! ```text
//! generations.json              creation-ordered generation names
//! <hex(name)>/<sha256(key)>.json one stored entry per request
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use shelf_core::{Method, Request, Response, StatusCode};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{CacheError, CacheResult};
use crate::storage::{CacheGeneration, CacheStorage};

const INDEX_FILE: &str = "generations.json";

/// A stored entry as written to disk.
#[derive(Debug, Serialize, Deserialize)]
struct StoredEntry {
    key: String,
    status: u16,
    headers: Vec<(String, String)>,
    /// Base64-encoded body.
    body: String,
    stored_at: DateTime<Utc>,
}

impl StoredEntry {
    fn from_response(key: String, response: &Response) -> Self {
        Self {
            key,
            status: response.status().as_u16(),
            headers: response.headers().to_vec(),
            body: BASE64.encode(response.body()),
            stored_at: Utc::now(),
        }
    }

    fn into_response(self) -> CacheResult<Response> {
        let status = StatusCode::from_u16(self.status)
            .map_err(|_| CacheError::Corrupt(format!("invalid status {} for {}", self.status, self.key)))?;
        let body = BASE64
            .decode(self.body.as_bytes())
            .map_err(|e| CacheError::Corrupt(format!("invalid body for {}: {}", self.key, e)))?;
        Ok(Response::new(status, body).with_headers(self.headers))
    }
}

/// Disk-backed cache generation.
pub struct DiskGeneration {
    name: String,
    dir: PathBuf,
    root: PathBuf,
    index: Arc<Mutex<()>>,
}

impl DiskGeneration {
    fn entry_path(&self, key: &str) -> PathBuf {
        let digest = Sha256::digest(key.as_bytes());
        self.dir.join(format!("{}.json", hex::encode(digest)))
    }

    async fn read_entry(path: &Path) -> CacheResult<Option<StoredEntry>> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CacheError::io(path, e)),
        }
    }
}

#[async_trait]
impl CacheGeneration for DiskGeneration {
    fn name(&self) -> &str {
        &self.name
    }

    async fn match_request(&self, request: &Request) -> CacheResult<Option<Response>> {
        if request.method() != Method::GET {
            return Ok(None);
        }
        let key = request.cache_key();
        match Self::read_entry(&self.entry_path(&key)).await? {
            Some(entry) if entry.key == key => entry.into_response().map(Some),
            _ => Ok(None),
        }
    }

    async fn put(&self, request: &Request, response: Response) -> CacheResult<()> {
        if request.method() != Method::GET {
            return Err(CacheError::UnsupportedMethod(request.method().clone()));
        }
        let key = request.cache_key();
        let path = self.entry_path(&key);
        let entry = StoredEntry::from_response(key, &response);
        let bytes = serde_json::to_vec(&entry)?;

        // Index lock held across the membership check and the write.
        let _guard = self.index.lock().await;
        if !read_index(&self.root).await?.iter().any(|n| n == &self.name) {
            return Err(CacheError::Deleted(self.name.clone()));
        }
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| CacheError::io(&self.dir, e))?;
        write_atomic(&path, &bytes).await?;
        debug!(generation = %self.name, key = %entry.key, "stored cache entry");
        Ok(())
    }

    async fn delete(&self, request: &Request) -> CacheResult<bool> {
        let path = self.entry_path(&request.cache_key());
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CacheError::io(path, e)),
        }
    }

    async fn keys(&self) -> CacheResult<Vec<String>> {
        let mut dir = match tokio::fs::read_dir(&self.dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(CacheError::io(&self.dir, e)),
        };

        let mut entries = Vec::new();
        while let Some(item) = dir.next_entry().await.map_err(|e| CacheError::io(&self.dir, e))? {
            let path = item.path();
            if path.extension().map_or(true, |ext| ext != "json") {
                continue;
            }
            if let Some(entry) = Self::read_entry(&path).await? {
                entries.push((entry.stored_at, entry.key));
            }
        }

        entries.sort();
        Ok(entries.into_iter().map(|(_, key)| key).collect())
    }
}

/// Disk-backed cache storage rooted at a directory.
pub struct DiskStorage {
    root: PathBuf,
    // Serializes index updates and entry writes.
    index: Arc<Mutex<()>>,
}

impl DiskStorage {
    /// Open (or lazily create) storage under a root directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            index: Arc::new(Mutex::new(())),
        }
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn generation_dir(&self, name: &str) -> PathBuf {
        self.root.join(hex::encode(name.as_bytes()))
    }

    fn generation(&self, name: &str) -> DiskGeneration {
        DiskGeneration {
            name: name.to_string(),
            dir: self.generation_dir(name),
            root: self.root.clone(),
            index: self.index.clone(),
        }
    }

    async fn read_index(&self) -> CacheResult<Vec<String>> {
        read_index(&self.root).await
    }

    async fn write_index(&self, names: &[String]) -> CacheResult<()> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| CacheError::io(&self.root, e))?;
        let bytes = serde_json::to_vec_pretty(names)?;
        write_atomic(&self.root.join(INDEX_FILE), &bytes).await
    }
}

#[async_trait]
impl CacheStorage for DiskStorage {
    async fn open(&self, name: &str) -> CacheResult<Arc<dyn CacheGeneration>> {
        let _guard = self.index.lock().await;
        let mut names = self.read_index().await?;
        if !names.iter().any(|n| n == name) {
            let dir = self.generation_dir(name);
            tokio::fs::create_dir_all(&dir)
                .await
                .map_err(|e| CacheError::io(&dir, e))?;
            names.push(name.to_string());
            self.write_index(&names).await?;
            debug!(generation = %name, "created cache generation");
        }
        Ok(Arc::new(self.generation(name)))
    }

    async fn get(&self, name: &str) -> CacheResult<Option<Arc<dyn CacheGeneration>>> {
        let _guard = self.index.lock().await;
        if self.read_index().await?.iter().any(|n| n == name) {
            Ok(Some(Arc::new(self.generation(name))))
        } else {
            Ok(None)
        }
    }

    async fn has(&self, name: &str) -> CacheResult<bool> {
        let _guard = self.index.lock().await;
        Ok(self.read_index().await?.iter().any(|n| n == name))
    }

    async fn delete(&self, name: &str) -> CacheResult<bool> {
        let _guard = self.index.lock().await;
        let mut names = self.read_index().await?;
        let before = names.len();
        names.retain(|n| n != name);
        if names.len() == before {
            return Ok(false);
        }
        self.write_index(&names).await?;

        let dir = self.generation_dir(name);
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(CacheError::io(dir, e)),
        }
        Ok(true)
    }

    async fn keys(&self) -> CacheResult<Vec<String>> {
        let _guard = self.index.lock().await;
        self.read_index().await
    }
}

async fn read_index(root: &Path) -> CacheResult<Vec<String>> {
    let path = root.join(INDEX_FILE);
    match tokio::fs::read(&path).await {
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(CacheError::io(path, e)),
    }
}

async fn write_atomic(path: &Path, bytes: &[u8]) -> CacheResult<()> {
    static NEXT_TMP: AtomicU64 = AtomicU64::new(0);
    let tmp = path.with_extension(format!("tmp{}", NEXT_TMP.fetch_add(1, Ordering::Relaxed)));
    tokio::fs::write(&tmp, bytes)
        .await
        .map_err(|e| CacheError::io(&tmp, e))?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| CacheError::io(path, e))
}
