//! Versioned cache generation names.
//!
//! Names are pure functions of the version tag, so every worker of the same
//! version agrees on which generations are live.

use shelf_core::VersionTag;

/// Prefix of the generation holding the precache catalog.
pub const STATIC_PREFIX: &str = "static-";

/// Prefix of the generation holding runtime responses.
pub const DYNAMIC_PREFIX: &str = "dynamic-";

/// Name of the current static generation.
pub fn current_static_name(version: &VersionTag) -> String {
    format!("{}{}", STATIC_PREFIX, version)
}

/// Name of the current dynamic generation.
pub fn current_dynamic_name(version: &VersionTag) -> String {
    format!("{}{}", DYNAMIC_PREFIX, version)
}

/// Check whether a generation name is live for a version.
pub fn is_current(name: &str, version: &VersionTag) -> bool {
    name == current_static_name(version) || name == current_dynamic_name(version)
}

/// The two live generation names for a version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generations {
    pub static_name: String,
    pub dynamic_name: String,
}

impl Generations {
    /// Derive the live generation names for a version.
    pub fn for_version(version: &VersionTag) -> Self {
        Self {
            static_name: current_static_name(version),
            dynamic_name: current_dynamic_name(version),
        }
    }

    /// Check whether a name is one of the live generations.
    pub fn contains(&self, name: &str) -> bool {
        name == self.static_name || name == self.dynamic_name
    }
}
