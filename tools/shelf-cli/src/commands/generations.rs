//! Cache generation inspection.

use anyhow::{Context as _, Result};
use serde_json::json;
use shelf_cache::{is_current, CacheGeneration, CacheStorage};

use super::GenerationsArgs;
use crate::context::Context;
use crate::output::status_badge;

/// Run the generations command.
pub async fn run(args: GenerationsArgs, ctx: &Context) -> Result<()> {
    let storage = ctx.storage();
    let version = &ctx.config.worker.version;
    let names = storage
        .keys()
        .await
        .with_context(|| format!("Failed to read cache at {}", storage.root().display()))?;

    let mut rows = Vec::with_capacity(names.len());
    for name in names {
        let Some(generation) = storage.get(&name).await? else {
            continue;
        };
        rows.push((name, generation.keys().await?));
    }

    if ctx.output.is_json() {
        let value: Vec<_> = rows
            .iter()
            .map(|(name, keys)| {
                json!({
                    "name": name,
                    "current": is_current(name, version),
                    "entries": keys,
                })
            })
            .collect();
        ctx.output.json(&value);
        return Ok(());
    }

    ctx.output.header("Cache generations");
    ctx.output.kv("cache", &storage.root().display().to_string());
    ctx.output.kv("version", version.as_str());

    if rows.is_empty() {
        ctx.output.info("No generations. Run `shelf install` first.");
        return Ok(());
    }

    println!();
    for (name, keys) in &rows {
        let status = if is_current(name, version) { "current" } else { "stale" };
        let count = format!("{} entries", keys.len());
        let badge = status_badge(status);
        ctx.output
            .table_row(&[name.as_str(), badge.as_str(), count.as_str()], &[20, 8, 0]);
        if args.entries {
            for key in keys {
                ctx.output.list_item(key);
            }
        }
    }

    Ok(())
}
