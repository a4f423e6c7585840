//! Shelf CLI - Command line tool for the offline story reader.
//!
//! Commands:
//! - `shelf catalog` - List the resources kept offline
//! - `shelf generations` - Show cache generations on disk
//! - `shelf install` - Precache and activate a version
//! - `shelf fetch` - Serve one request through the worker
//! - `shelf message` - Post a control message to the worker
//! - `shelf stories` - List and play stories
//! - `shelf config` - Manage configuration

mod commands;
mod config;
mod context;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use commands::{
    CatalogArgs, ConfigArgs, FetchArgs, GenerationsArgs, InstallArgs, MessageArgs, StoriesArgs,
};

/// Shelf CLI - Run the offline story reader worker locally
#[derive(Parser)]
#[command(name = "shelf")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the resources kept available offline
    Catalog(CatalogArgs),

    /// Show cache generations and their entries
    Generations(GenerationsArgs),

    /// Precache the catalog and activate a version
    Install(InstallArgs),

    /// Serve a request through the worker
    Fetch(FetchArgs),

    /// Post a control message to the worker
    Message(MessageArgs),

    /// List and play stories
    Stories(StoriesArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

fn init_tracing(verbose: bool, json: bool) {
    let default = if verbose {
        "shelf_worker=debug,shelf_cache=debug,shelf_stories=debug,info"
    } else {
        "warn"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default.into());

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.json);

    let output = output::Output::new(cli.verbose, cli.json);

    let config_path = cli.config.as_deref();
    let ctx = context::Context::load(config_path, output)?;
    tracing::debug!(cwd = %ctx.cwd.display(), version = %ctx.config.worker.version, "context loaded");

    let result = match cli.command {
        Commands::Catalog(args) => commands::catalog::run(args, &ctx).await,
        Commands::Generations(args) => commands::generations::run(args, &ctx).await,
        Commands::Install(args) => commands::install::run(args, &ctx).await,
        Commands::Fetch(args) => commands::fetch::run(args, &ctx).await,
        Commands::Message(args) => commands::message::run(args, &ctx).await,
        Commands::Stories(args) => commands::stories::run(args, &ctx).await,
        Commands::Config(args) => commands::config::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
