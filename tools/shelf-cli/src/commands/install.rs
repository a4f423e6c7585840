//! Install and activate a worker version.

use std::time::Duration;

use anyhow::{Context as _, Result};
use serde_json::json;
use shelf_core::VersionTag;
use shelf_worker::Registration;

use super::InstallArgs;
use crate::context::Context;
use crate::output::status_badge;

/// Run the install command.
pub async fn run(args: InstallArgs, ctx: &Context) -> Result<()> {
    let mut config = ctx.config.worker.clone();
    if let Some(version) = args.version {
        config.version = VersionTag::new(version).context("Invalid version tag")?;
    }
    if let Some(ms) = args.timeout_ms {
        config = config.with_precache_timeout(Duration::from_millis(ms));
    }
    let version = config.version.clone();

    let network = ctx.network(false);
    let mut registration = Registration::new(network.clone());

    let spinner = ctx
        .output
        .spinner(&format!("Installing {} from {}", version, ctx.config.site.root.display()));
    let outcome = registration
        .update(ctx.worker(config, network))
        .await
        .with_context(|| format!("Failed to install {}", version))?;
    registration.settle().await;
    spinner.finish_and_clear();

    if ctx.output.is_json() {
        ctx.output.json(&json!({
            "version": version.as_str(),
            "state": outcome.state.to_string(),
            "install": outcome.install,
            "activation": outcome.activation,
        }));
        return Ok(());
    }

    ctx.output.header(&format!("Installed {}", version));
    ctx.output.kv("generation", &outcome.install.generation);
    ctx.output.kv("state", &status_badge(&outcome.state.to_string()));
    ctx.output
        .kv("precached", &outcome.install.cached.len().to_string());

    for failure in &outcome.install.failed {
        ctx.output
            .warn(&format!("{}: {}", failure.path, failure.reason));
    }

    if let Some(activation) = &outcome.activation {
        for name in &activation.deleted {
            ctx.output.debug(&format!("deleted generation {}", name));
        }
        for failure in &activation.failed {
            ctx.output
                .warn(&format!("could not delete {}: {}", failure.name, failure.reason));
        }
        if !activation.deleted.is_empty() {
            ctx.output.info(&format!(
                "Removed {} old generation(s)",
                activation.deleted.len()
            ));
        }
    }

    if outcome.install.is_complete() {
        ctx.output.success("All resources available offline");
    } else {
        ctx.output.warn(&format!(
            "{} resource(s) not cached; they need the network",
            outcome.install.failed.len()
        ));
    }

    Ok(())
}
