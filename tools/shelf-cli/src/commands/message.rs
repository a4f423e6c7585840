//! Post a control message to the worker.

use anyhow::{Context as _, Result};
use serde_json::{json, Value};
use shelf_core::VersionTag;
use shelf_worker::{ControlMessage, Registration};

use super::MessageArgs;
use crate::context::Context;

/// Run the message command.
///
/// Installs the configured version as the active worker, optionally installs
/// `--next` as a waiting worker, opens a page and posts the message.
pub async fn run(args: MessageArgs, ctx: &Context) -> Result<()> {
    let message: Value =
        serde_json::from_str(&args.message).context("Message is not valid JSON")?;

    let network = ctx.network(args.offline);
    let mut registration = Registration::new(network.clone());

    let current = ctx.config.worker.clone();
    ctx.output.debug(&format!("installing {}", current.version));
    registration
        .update(ctx.worker(current, network.clone()))
        .await
        .context("Failed to install the current version")?;
    let page = registration.open_page();

    if let Some(next) = args.next {
        let mut config = ctx.config.worker.clone().with_skip_waiting(false);
        config.version = VersionTag::new(next).context("Invalid version tag")?;
        ctx.output
            .debug(&format!("installing {} as waiting worker", config.version));
        registration
            .update(ctx.worker(config, network))
            .await
            .context("Failed to install the next version")?;
    }

    ctx.output.debug("posting message");
    let recognized = ControlMessage::parse(&message);
    let promoted = registration.post_message(&message).await;
    registration.settle().await;

    let active = registration.active().map(|w| w.version().to_string());
    let waiting = registration.waiting().map(|w| w.version().to_string());
    let controller = registration
        .controller_of(page)
        .map(|w| w.version().to_string());

    if ctx.output.is_json() {
        ctx.output.json(&json!({
            "recognized": recognized.is_some(),
            "promoted": promoted.is_some(),
            "active": active,
            "waiting": waiting,
            "controller": controller,
            "activation": promoted,
        }));
        return Ok(());
    }

    match (recognized, &promoted) {
        (None, _) => ctx.output.warn("Message not recognized; ignored"),
        (Some(_), Some(report)) => ctx.output.success(&format!(
            "Waiting worker activated; removed {} old generation(s)",
            report.deleted.len()
        )),
        (Some(_), None) => ctx.output.info("No waiting worker to activate"),
    }

    let none = "-".to_string();
    ctx.output.kv("active", active.as_ref().unwrap_or(&none));
    ctx.output.kv("waiting", waiting.as_ref().unwrap_or(&none));
    ctx.output
        .kv("page controller", controller.as_ref().unwrap_or(&none));

    Ok(())
}
