//! Activate: delete every cache generation that is not current.

use futures::future::join_all;
use serde::Serialize;
use shelf_cache::{CacheResult, CacheStorage, Generations};
use tracing::{info, warn};

/// A generation that could not be deleted.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteFailure {
    pub name: String,
    pub reason: String,
}

/// Outcome of generation cleanup.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ActivationReport {
    /// Current generations left in place.
    pub kept: Vec<String>,
    /// Superseded generations deleted.
    pub deleted: Vec<String>,
    /// Superseded generations whose deletion failed.
    pub failed: Vec<DeleteFailure>,
}

/// Delete every generation whose name is not one of `live`.
///
/// Deletions run concurrently; a failed deletion is logged and reported and
/// does not stop the others. Only enumerating the generations can fail.
pub async fn collect_garbage(
    storage: &dyn CacheStorage,
    live: &Generations,
) -> CacheResult<ActivationReport> {
    let names = storage.keys().await?;
    let (kept, stale): (Vec<String>, Vec<String>) =
        names.into_iter().partition(|name| live.contains(name));

    let results = join_all(stale.into_iter().map(|name| async move {
        let outcome = storage.delete(&name).await;
        (name, outcome)
    }))
    .await;

    let mut report = ActivationReport {
        kept,
        ..Default::default()
    };

    for (name, outcome) in results {
        match outcome {
            Ok(_) => {
                info!(generation = %name, "deleted old cache generation");
                report.deleted.push(name);
            }
            Err(e) => {
                warn!(generation = %name, error = %e, "failed to delete cache generation");
                report.failed.push(DeleteFailure {
                    name,
                    reason: e.to_string(),
                });
            }
        }
    }

    Ok(report)
}
