//! Offline caching worker for the story reader.
//!
//! This crate provides:
//! - `Worker` - Install, activate, fetch and message handlers for one version
//! - `Registration` - Host-side lifecycle and page controller assignment
//! - `Network` - Outbound fetch seam, with `SiteDirectory` and `Offline` backends
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use shelf_cache::MemoryStorage;
//! use shelf_worker::{Registration, SiteDirectory, Worker};
//!
//! let network = Arc::new(SiteDirectory::new(scope.clone(), "./site"));
//! let storage = Arc::new(MemoryStorage::new());
//!
//! let mut registration = Registration::new(network.clone());
//! registration.update(Worker::new(config, storage, network)).await?;
//!
//! let page = registration.open_page();
//! let served = registration.fetch(page, &request).await?;
//! ```

mod activate;
mod controller;
mod error;
mod fallback;
mod install;
mod message;
mod network;
mod registration;
mod strategy;
mod worker;

pub use activate::*;
pub use controller::*;
pub use error::*;
pub use fallback::*;
pub use install::*;
pub use message::*;
pub use network::*;
pub use registration::*;
pub use strategy::*;
pub use worker::*;
