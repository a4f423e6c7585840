//! Worker configuration.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

/// Default deployed version tag.
pub const DEFAULT_VERSION: &str = "v1.2";

/// Default app scope used when none is configured.
pub const DEFAULT_SCOPE: &str = "https://stories.local/";

/// Error for an unusable version tag.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionTagError {
    #[error("version tag must not be empty")]
    Empty,
    #[error("version tag '{0}' must not contain whitespace")]
    Whitespace(String),
}

/// Version tag embedded in cache generation names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionTag(String);

impl VersionTag {
    /// Create a version tag.
    pub fn new(tag: impl Into<String>) -> Result<Self, VersionTagError> {
        let tag = tag.into();
        if tag.is_empty() {
            return Err(VersionTagError::Empty);
        }
        if tag.chars().any(char::is_whitespace) {
            return Err(VersionTagError::Whitespace(tag));
        }
        Ok(Self(tag))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for VersionTag {
    type Error = VersionTagError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<VersionTag> for String {
    fn from(tag: VersionTag) -> Self {
        tag.0
    }
}

impl fmt::Display for VersionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Configuration for a deployed worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Version tag; generation names derive from it.
    pub version: VersionTag,

    /// Base URL of the app; catalog paths resolve against it.
    #[serde(default = "default_scope")]
    pub scope: Url,

    /// Skip the waiting phase as soon as install finishes.
    #[serde(default = "default_true")]
    pub skip_waiting_on_install: bool,

    /// Per-resource precache timeout in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precache_timeout_ms: Option<u64>,
}

fn default_scope() -> Url {
    Url::parse(DEFAULT_SCOPE).expect("DEFAULT_SCOPE is a valid URL")
}

fn default_true() -> bool {
    true
}

impl WorkerConfig {
    /// Create a configuration for a version under a scope.
    pub fn new(version: VersionTag, scope: Url) -> Self {
        Self {
            version,
            scope,
            skip_waiting_on_install: true,
            precache_timeout_ms: None,
        }
    }

    /// Set whether install skips the waiting phase.
    pub fn with_skip_waiting(mut self, skip: bool) -> Self {
        self.skip_waiting_on_install = skip;
        self
    }

    /// Set a per-resource precache timeout.
    pub fn with_precache_timeout(mut self, timeout: Duration) -> Self {
        self.precache_timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    /// Get the per-resource precache timeout.
    pub fn precache_timeout(&self) -> Option<Duration> {
        self.precache_timeout_ms.map(Duration::from_millis)
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self::new(VersionTag(DEFAULT_VERSION.to_string()), default_scope())
    }
}
