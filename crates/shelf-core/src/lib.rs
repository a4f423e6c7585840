//! Core abstractions for the offline story reader.
//!
//! This crate provides the fundamental types shared by the cache and worker:
//! - `Request` / `Response` - The intercepted request and the stored response
//! - `RequestDestination` / `RequestMode` - What a request is for
//! - `WorkerState` - Worker lifecycle tracking
//! - `WorkerConfig` / `VersionTag` - Deploy-time worker configuration

mod config;
mod lifecycle;
mod request;
mod response;

pub use config::*;
pub use lifecycle::*;
pub use request::*;
pub use response::*;
