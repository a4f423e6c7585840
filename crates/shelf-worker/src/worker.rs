//! A worker for one deployed version.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use shelf_cache::{CacheStorage, Catalog, Generations};
use shelf_core::{VersionTag, WorkerConfig};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::activate::{collect_garbage, ActivationReport};
use crate::error::InstallError;
use crate::install::{precache, InstallReport};
use crate::message::ControlMessage;
use crate::network::Network;

/// Unique worker identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkerId(u64);

impl WorkerId {
    fn next() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[cfg(test)]
    pub(crate) fn from_raw(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for WorkerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "worker-{}", self.0)
    }
}

/// Result of the install handler.
#[derive(Debug, Clone)]
pub struct InstallOutcome {
    pub report: InstallReport,
    /// The worker asked to skip the waiting phase.
    pub skip_waiting: bool,
}

/// Result of the activate handler.
#[derive(Debug, Clone)]
pub struct ActivateOutcome {
    pub report: ActivationReport,
    /// The worker asked to take control of open pages.
    pub claim: bool,
}

/// Event handlers for one deployed version.
///
/// Handlers are async functions the host awaits; the worker itself holds no
/// lifecycle state. Cache writes that outlive a fetch response are tracked so
/// the host can wait for them with [`Worker::settle`].
pub struct Worker {
    id: WorkerId,
    config: WorkerConfig,
    catalog: Catalog,
    generations: Generations,
    pub(crate) storage: Arc<dyn CacheStorage>,
    pub(crate) network: Arc<dyn Network>,
    retired: Arc<AtomicBool>,
    background: Mutex<Vec<JoinHandle<()>>>,
}

impl Worker {
    /// Create a worker serving the story reader catalog.
    pub fn new(
        config: WorkerConfig,
        storage: Arc<dyn CacheStorage>,
        network: Arc<dyn Network>,
    ) -> Self {
        let catalog = Catalog::story_reader(config.scope.clone());
        let generations = Generations::for_version(&config.version);
        Self {
            id: WorkerId::next(),
            config,
            catalog,
            generations,
            storage,
            network,
            retired: Arc::new(AtomicBool::new(false)),
            background: Mutex::new(Vec::new()),
        }
    }

    /// Replace the resource catalog.
    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn id(&self) -> WorkerId {
        self.id
    }

    pub fn version(&self) -> &VersionTag {
        &self.config.version
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn generations(&self) -> &Generations {
        &self.generations
    }

    /// Install handler: precache the catalog, then ask to skip waiting.
    pub async fn install(&self) -> Result<InstallOutcome, InstallError> {
        info!(version = %self.config.version, "installing worker");
        let report = precache(
            &self.catalog,
            self.storage.as_ref(),
            self.network.as_ref(),
            &self.config.version,
            self.config.precache_timeout(),
        )
        .await?;

        Ok(InstallOutcome {
            report,
            skip_waiting: self.config.skip_waiting_on_install,
        })
    }

    /// Activate handler: drop superseded generations, then claim pages.
    pub async fn activate(&self) -> ActivateOutcome {
        info!(version = %self.config.version, "activating worker");
        let report = match collect_garbage(self.storage.as_ref(), &self.generations).await {
            Ok(report) => report,
            Err(e) => {
                warn!(error = %e, "could not list cache generations; skipping cleanup");
                ActivationReport::default()
            }
        };

        ActivateOutcome {
            report,
            claim: true,
        }
    }

    /// Message handler. Unrecognized messages are ignored.
    pub fn handle_message(&self, message: &serde_json::Value) -> Option<ControlMessage> {
        let parsed = ControlMessage::parse(message);
        if parsed.is_none() {
            tracing::debug!(version = %self.config.version, "ignoring unrecognized message");
        }
        parsed
    }

    /// Whether the worker was made redundant. A retired worker still answers
    /// fetches but no longer writes to the cache.
    pub fn is_retired(&self) -> bool {
        self.retired.load(Ordering::Acquire)
    }

    pub(crate) fn retire(&self) {
        self.retired.store(true, Ordering::Release);
    }

    pub(crate) fn retired_flag(&self) -> Arc<AtomicBool> {
        self.retired.clone()
    }

    /// Track a task that must finish before the worker is idle.
    pub(crate) fn extend_lifetime(&self, task: JoinHandle<()>) {
        match self.background.lock() {
            Ok(mut tasks) => {
                tasks.retain(|t| !t.is_finished());
                tasks.push(task);
            }
            Err(_) => warn!("background task list poisoned; task left untracked"),
        }
    }

    /// Wait for every tracked background task.
    pub async fn settle(&self) {
        let tasks = match self.background.lock() {
            Ok(mut tasks) => std::mem::take(&mut *tasks),
            Err(_) => return,
        };
        for task in tasks {
            if let Err(e) = task.await {
                warn!(error = %e, "background task failed");
            }
        }
    }
}

impl std::fmt::Debug for Worker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker")
            .field("id", &self.id)
            .field("version", &self.config.version)
            .field("scope", &self.config.scope.as_str())
            .finish()
    }
}
