//! CLI configuration.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use shelf_core::WorkerConfig;

/// Config file names searched for, in order.
pub const CONFIG_NAMES: [&str; 3] = ["shelf.toml", ".shelf.toml", "shelf.json"];

/// CLI configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Worker configuration.
    #[serde(default)]
    pub worker: WorkerConfig,

    /// Local site to serve requests from.
    #[serde(default)]
    pub site: SiteConfig,

    /// Cache storage location.
    #[serde(default)]
    pub storage: StorageConfig,
}

impl CliConfig {
    /// Load config from a file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        if path.ends_with(".json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path))
        }
    }
}

/// Site directory configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Directory holding the app's static files.
    #[serde(default = "default_site_root")]
    pub root: PathBuf,

    /// Story library (JSON), relative to the working directory.
    #[serde(default = "default_stories")]
    pub stories: PathBuf,
}

fn default_site_root() -> PathBuf {
    PathBuf::from("site")
}

fn default_stories() -> PathBuf {
    PathBuf::from("site/data/stories.json")
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            root: default_site_root(),
            stories: default_stories(),
        }
    }
}

/// Cache storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory of the on-disk cache.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from(".shelf/cache")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
        }
    }
}

/// Generate a default shelf.toml config file.
pub fn generate_default_config(version: &str, scope: &str) -> String {
    format!(
        r#"# Offline story reader configuration

[worker]
version = "{version}"
scope = "{scope}"
skip_waiting_on_install = true
# precache_timeout_ms = 10000

[site]
root = "site"
stories = "site/data/stories.json"

[storage]
cache_dir = ".shelf/cache"
"#,
        version = version,
        scope = scope
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses() {
        let content = generate_default_config("v2.0", "https://stories.example/app/");
        let config: CliConfig = toml::from_str(&content).unwrap();
        assert_eq!(config.worker.version.as_str(), "v2.0");
        assert_eq!(config.worker.scope.as_str(), "https://stories.example/app/");
        assert!(config.worker.skip_waiting_on_install);
        assert_eq!(config.site.root, PathBuf::from("site"));
        assert_eq!(config.storage.cache_dir, PathBuf::from(".shelf/cache"));
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config: CliConfig = toml::from_str("[worker]\nversion = \"v9\"\n").unwrap();
        assert_eq!(config.worker.version.as_str(), "v9");
        assert_eq!(config.worker.scope.as_str(), shelf_core::DEFAULT_SCOPE);
        assert_eq!(config.site.stories, PathBuf::from("site/data/stories.json"));
    }

    #[test]
    fn test_rejects_empty_version() {
        assert!(toml::from_str::<CliConfig>("[worker]\nversion = \"\"\n").is_err());
    }

    #[test]
    fn test_load_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shelf.json");
        std::fs::write(
            &path,
            r#"{"worker": {"version": "v3", "skip_waiting_on_install": false}}"#,
        )
        .unwrap();

        let loaded = CliConfig::load(path.to_str().unwrap()).unwrap();
        assert_eq!(loaded.worker.version.as_str(), "v3");
        assert!(!loaded.worker.skip_waiting_on_install);
        assert_eq!(loaded.storage.cache_dir, PathBuf::from(".shelf/cache"));
    }
}
