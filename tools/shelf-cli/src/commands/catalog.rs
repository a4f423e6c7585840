//! Catalog listing.

use anyhow::{anyhow, Result};
use serde_json::json;
use shelf_cache::{Catalog, ResourceRole};

use super::CatalogArgs;
use crate::context::Context;

/// Run the catalog command.
pub async fn run(args: CatalogArgs, ctx: &Context) -> Result<()> {
    let catalog = Catalog::story_reader(ctx.config.worker.scope.clone());
    let role = args
        .role
        .as_deref()
        .map(|r| ResourceRole::parse(r).ok_or_else(|| anyhow!("Unknown role: {}", r)))
        .transpose()?;

    let entries: Vec<_> = catalog
        .entries()
        .iter()
        .filter(|e| role.map_or(true, |r| e.role == r))
        .collect();

    if ctx.output.is_json() {
        let rows: Vec<_> = entries
            .iter()
            .map(|e| {
                json!({
                    "path": e.path,
                    "role": e.role.to_string(),
                    "url": catalog.resolve(&e.path).ok().map(|u| u.to_string()),
                })
            })
            .collect();
        ctx.output.json(&rows);
        return Ok(());
    }

    ctx.output.header(&format!("Offline resources ({})", entries.len()));
    ctx.output.kv("scope", catalog.scope().as_str());
    println!();
    for entry in &entries {
        let role = entry.role.to_string();
        ctx.output.table_row(&[role.as_str(), entry.path.as_str()], &[10, 0]);
    }

    Ok(())
}
