//! In-memory cache storage (for tests and simulation).

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use shelf_core::{Method, Request, Response};

use crate::error::{CacheError, CacheResult};
use crate::storage::{CacheGeneration, CacheStorage};

fn poisoned() -> CacheError {
    CacheError::Storage("lock poisoned".to_string())
}

/// In-memory cache generation.
pub struct MemoryGeneration {
    name: String,
    entries: RwLock<Entries>,
}

#[derive(Default)]
struct Entries {
    next_seq: u64,
    by_key: HashMap<String, (u64, Response)>,
}

impl MemoryGeneration {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: RwLock::new(Entries::default()),
        }
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.by_key.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CacheGeneration for MemoryGeneration {
    fn name(&self) -> &str {
        &self.name
    }

    async fn match_request(&self, request: &Request) -> CacheResult<Option<Response>> {
        if request.method() != Method::GET {
            return Ok(None);
        }
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(entries
            .by_key
            .get(&request.cache_key())
            .map(|(_, response)| response.clone()))
    }

    async fn put(&self, request: &Request, response: Response) -> CacheResult<()> {
        if request.method() != Method::GET {
            return Err(CacheError::UnsupportedMethod(request.method().clone()));
        }
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        let seq = entries.next_seq;
        entries.next_seq += 1;
        entries.by_key.insert(request.cache_key(), (seq, response));
        Ok(())
    }

    async fn delete(&self, request: &Request) -> CacheResult<bool> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        Ok(entries.by_key.remove(&request.cache_key()).is_some())
    }

    async fn keys(&self) -> CacheResult<Vec<String>> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        let mut keyed: Vec<(u64, &String)> = entries
            .by_key
            .iter()
            .map(|(key, (seq, _))| (*seq, key))
            .collect();
        keyed.sort_by_key(|(seq, _)| *seq);
        Ok(keyed.into_iter().map(|(_, key)| key.clone()).collect())
    }
}

/// In-memory cache storage.
///
/// Generations are kept in creation order so lookups across all of them are
/// deterministic.
#[derive(Default)]
pub struct MemoryStorage {
    generations: RwLock<Vec<Arc<MemoryGeneration>>>,
}

impl MemoryStorage {
    /// Create an empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a generation by name without creating it.
    pub fn generation(&self, name: &str) -> Option<Arc<MemoryGeneration>> {
        self.generations
            .read()
            .ok()?
            .iter()
            .find(|g| g.name == name)
            .cloned()
    }
}

#[async_trait]
impl CacheStorage for MemoryStorage {
    async fn open(&self, name: &str) -> CacheResult<Arc<dyn CacheGeneration>> {
        let mut generations = self.generations.write().map_err(|_| poisoned())?;
        if let Some(existing) = generations.iter().find(|g| g.name == name) {
            return Ok(existing.clone());
        }
        let created = Arc::new(MemoryGeneration::new(name));
        generations.push(created.clone());
        Ok(created)
    }

    async fn get(&self, name: &str) -> CacheResult<Option<Arc<dyn CacheGeneration>>> {
        let generations = self.generations.read().map_err(|_| poisoned())?;
        Ok(generations
            .iter()
            .find(|g| g.name == name)
            .map(|g| g.clone() as Arc<dyn CacheGeneration>))
    }

    async fn has(&self, name: &str) -> CacheResult<bool> {
        let generations = self.generations.read().map_err(|_| poisoned())?;
        Ok(generations.iter().any(|g| g.name == name))
    }

    async fn delete(&self, name: &str) -> CacheResult<bool> {
        let mut generations = self.generations.write().map_err(|_| poisoned())?;
        let before = generations.len();
        generations.retain(|g| g.name != name);
        Ok(generations.len() != before)
    }

    async fn keys(&self) -> CacheResult<Vec<String>> {
        let generations = self.generations.read().map_err(|_| poisoned())?;
        Ok(generations.iter().map(|g| g.name.clone()).collect())
    }
}
