//! Caching infrastructure for the offline story reader.
//!
//! This crate provides:
//! - `Catalog` - The resources that must be available offline
//! - `current_static_name` / `current_dynamic_name` - Versioned generation names
//! - `CacheStorage` / `CacheGeneration` - Named request/response stores
//! - `MemoryStorage` / `DiskStorage` - Storage backends
//!
//! # Example
//!
//! ```ignore
//! use shelf_cache::{current_static_name, Catalog, CacheStorage, MemoryStorage};
//!
//! let catalog = Catalog::story_reader(scope);
//! assert!(catalog.is_precached("/index.html"));
//!
//! let storage = MemoryStorage::new();
//! let generation = storage.open(&current_static_name(&version)).await?;
//! ```

mod catalog;
mod disk;
mod error;
mod memory;
mod storage;
mod version;

pub use catalog::*;
pub use disk::*;
pub use error::*;
pub use memory::*;
pub use storage::*;
pub use version::*;
