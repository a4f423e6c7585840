//! Install: best-effort precache of the resource catalog.

use std::time::Duration;

use futures::future::join_all;
use serde::Serialize;
use shelf_cache::{current_static_name, CacheGeneration, CacheStorage, Catalog, ResourceEntry, ResourceRole};
use shelf_core::{Request, RequestDestination, VersionTag};
use tracing::{info, warn};

use crate::error::{InstallError, PrecacheError};
use crate::network::Network;

/// A resource that could not be precached.
#[derive(Debug, Clone, Serialize)]
pub struct PrecacheFailure {
    /// Catalog path of the resource.
    pub path: String,
    /// Why it failed.
    pub reason: String,
}

/// Outcome of precaching the catalog.
#[derive(Debug, Clone, Serialize)]
pub struct InstallReport {
    /// Static generation that was filled.
    pub generation: String,
    /// Resources stored, in catalog order.
    pub cached: Vec<String>,
    /// Resources that failed, in catalog order.
    pub failed: Vec<PrecacheFailure>,
}

impl InstallReport {
    /// Whether every catalog resource was stored.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Precache every catalog resource into the static generation of `version`.
///
/// Resources are fetched concurrently and independently. A failing resource
/// is logged and reported, never fatal; only failing to open the static
/// generation aborts the install.
pub async fn precache(
    catalog: &Catalog,
    storage: &dyn CacheStorage,
    network: &dyn Network,
    version: &VersionTag,
    timeout: Option<Duration>,
) -> Result<InstallReport, InstallError> {
    let name = current_static_name(version);
    info!(generation = %name, resources = catalog.len(), "precaching static resources");

    let generation = storage
        .open(&name)
        .await
        .map_err(|source| InstallError::OpenGeneration {
            name: name.clone(),
            source,
        })?;

    let results = join_all(catalog.entries().iter().map(|entry| {
        let generation = generation.as_ref();
        async move {
            let outcome = match timeout {
                Some(limit) => tokio::time::timeout(limit, precache_one(catalog, generation, network, entry))
                    .await
                    .unwrap_or(Err(PrecacheError::Timeout(limit))),
                None => precache_one(catalog, generation, network, entry).await,
            };
            (entry, outcome)
        }
    }))
    .await;

    let mut report = InstallReport {
        generation: name,
        cached: Vec::new(),
        failed: Vec::new(),
    };

    for (entry, outcome) in results {
        match outcome {
            Ok(()) => report.cached.push(entry.path.clone()),
            Err(e) => {
                warn!(path = %entry.path, error = %e, "precache failed");
                report.failed.push(PrecacheFailure {
                    path: entry.path.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    info!(
        generation = %report.generation,
        cached = report.cached.len(),
        failed = report.failed.len(),
        "precache finished"
    );
    Ok(report)
}

async fn precache_one(
    catalog: &Catalog,
    generation: &dyn CacheGeneration,
    network: &dyn Network,
    entry: &ResourceEntry,
) -> Result<(), PrecacheError> {
    let url = catalog.resolve(&entry.path)?;
    let request = Request::get(url).with_destination(destination_for(entry.role));

    let response = network.fetch(&request).await?;
    if !response.ok() {
        return Err(PrecacheError::Status(response.status()));
    }

    generation.put(&request, response).await?;
    Ok(())
}

fn destination_for(role: ResourceRole) -> RequestDestination {
    match role {
        ResourceRole::Shell => RequestDestination::Document,
        ResourceRole::Stylesheet | ResourceRole::Font => RequestDestination::Style,
        ResourceRole::Script => RequestDestination::Script,
        ResourceRole::Data => RequestDestination::Empty,
        ResourceRole::Icon | ResourceRole::Image => RequestDestination::Image,
    }
}
