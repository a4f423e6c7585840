//! Configuration management commands.

use std::fs;

use anyhow::{bail, Context as _, Result};
use shelf_core::VersionTag;
use shelf_stories::Library;
use url::Url;

use super::{ConfigArgs, ConfigCommand};
use crate::config::{generate_default_config, CONFIG_NAMES};
use crate::context::Context;

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Init {
            force,
            version,
            scope,
        } => init_config(force, &version, &scope, ctx),
        ConfigCommand::Validate => validate_config(ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");

    let worker = &ctx.config.worker;
    ctx.output.info("[worker]");
    ctx.output.kv("version", worker.version.as_str());
    ctx.output.kv("scope", worker.scope.as_str());
    ctx.output.kv(
        "skip_waiting_on_install",
        &worker.skip_waiting_on_install.to_string(),
    );
    if let Some(ms) = worker.precache_timeout_ms {
        ctx.output.kv("precache_timeout_ms", &ms.to_string());
    }

    ctx.output.info("[site]");
    ctx.output.kv("root", &ctx.config.site.root.display().to_string());
    ctx.output
        .kv("stories", &ctx.config.site.stories.display().to_string());

    ctx.output.info("[storage]");
    ctx.output.kv(
        "cache_dir",
        &ctx.config.storage.cache_dir.display().to_string(),
    );

    Ok(())
}

fn init_config(force: bool, version: &str, scope: &str, ctx: &Context) -> Result<()> {
    let config_path = ctx.cwd.join(CONFIG_NAMES[0]);

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    VersionTag::new(version).context("Invalid version tag")?;
    let scope = Url::parse(scope).with_context(|| format!("Invalid scope URL: {}", scope))?;

    let content = generate_default_config(version, scope.as_str());
    fs::write(&config_path, content)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    ctx.output
        .success(&format!("Created: {}", config_path.display()));

    Ok(())
}

fn validate_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Validating configuration");

    let mut errors: Vec<String> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();

    let scope = &ctx.config.worker.scope;
    if scope.cannot_be_a_base() {
        errors.push(format!("worker.scope '{}' cannot be a base URL", scope));
    } else if !scope.path().ends_with('/') {
        warnings.push(format!(
            "worker.scope '{}' does not end with '/'; it is treated as a directory",
            scope
        ));
    }

    if ctx.config.worker.precache_timeout_ms == Some(0) {
        errors.push("worker.precache_timeout_ms must be greater than 0".to_string());
    }

    let root = ctx.resolve_path(&ctx.config.site.root);
    if !root.is_dir() {
        warnings.push(format!("site.root '{}' does not exist", root.display()));
    }

    let stories = ctx.stories_path();
    if stories.exists() {
        if let Err(e) = Library::load(&stories) {
            errors.push(format!("site.stories: {}", e));
        }
    } else {
        warnings.push(format!("site.stories '{}' does not exist", stories.display()));
    }

    if errors.is_empty() && warnings.is_empty() {
        ctx.output.success("Configuration is valid");
        return Ok(());
    }

    for error in &errors {
        ctx.output.error(&format!("Error: {}", error));
    }

    for warning in &warnings {
        ctx.output.warn(&format!("Warning: {}", warning));
    }

    if !errors.is_empty() {
        bail!("Configuration has {} error(s)", errors.len());
    }

    ctx.output.success("Configuration is valid (with warnings)");

    Ok(())
}
