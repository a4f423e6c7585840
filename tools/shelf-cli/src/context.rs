//! CLI execution context.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use shelf_cache::DiskStorage;
use shelf_core::WorkerConfig;
use shelf_worker::{Network, Offline, SiteDirectory, Worker};

use crate::config::{CliConfig, CONFIG_NAMES};
use crate::output::Output;

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: CliConfig,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let config = if let Some(path) = config_path {
            CliConfig::load(path)?
        } else {
            Self::find_config(&cwd).unwrap_or_default()
        };

        Ok(Self { config, output, cwd })
    }

    /// Find config file in directory tree.
    fn find_config(start: &Path) -> Option<CliConfig> {
        let mut current = start.to_path_buf();
        loop {
            for name in &CONFIG_NAMES {
                let config_path = current.join(name);
                if config_path.exists() {
                    if let Ok(config) = CliConfig::load(config_path.to_str()?) {
                        return Some(config);
                    }
                }
            }

            if !current.pop() {
                break;
            }
        }

        None
    }

    /// Resolve a path relative to the working directory.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }

    /// The on-disk cache.
    pub fn storage(&self) -> Arc<DiskStorage> {
        Arc::new(DiskStorage::new(
            self.resolve_path(&self.config.storage.cache_dir),
        ))
    }

    /// The network: the local site directory, or nothing when offline.
    pub fn network(&self, offline: bool) -> Arc<dyn Network> {
        if offline {
            Arc::new(Offline)
        } else {
            Arc::new(SiteDirectory::new(
                self.config.worker.scope.clone(),
                self.resolve_path(&self.config.site.root),
            ))
        }
    }

    /// A worker for `config` over the on-disk cache.
    pub fn worker(&self, config: WorkerConfig, network: Arc<dyn Network>) -> Worker {
        Worker::new(config, self.storage(), network)
    }

    /// Path of the story library.
    pub fn stories_path(&self) -> PathBuf {
        self.resolve_path(&self.config.site.stories)
    }
}
