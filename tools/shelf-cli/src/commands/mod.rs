//! CLI command implementations.

pub mod catalog;
pub mod config;
pub mod fetch;
pub mod generations;
pub mod install;
pub mod message;
pub mod stories;

use clap::{Args, Subcommand};

/// Arguments for the catalog command.
#[derive(Args)]
pub struct CatalogArgs {
    /// Only list resources with this role (shell, stylesheet, script, data, icon, font, image).
    #[arg(short, long)]
    pub role: Option<String>,
}

/// Arguments for the generations command.
#[derive(Args)]
pub struct GenerationsArgs {
    /// List the request keys stored in each generation.
    #[arg(short, long)]
    pub entries: bool,
}

/// Arguments for the install command.
#[derive(Args)]
pub struct InstallArgs {
    /// Version tag to install (default: from config).
    #[arg(long)]
    pub version: Option<String>,

    /// Per-resource precache timeout in milliseconds.
    #[arg(long)]
    pub timeout_ms: Option<u64>,
}

/// Arguments for the fetch command.
#[derive(Args)]
pub struct FetchArgs {
    /// URL to fetch, absolute or relative to the scope.
    pub url: String,

    /// Fail every network request.
    #[arg(long)]
    pub offline: bool,

    /// Request destination (document, image, style, script, font, manifest).
    #[arg(short, long)]
    pub destination: Option<String>,

    /// Send as a page navigation.
    #[arg(short, long)]
    pub navigate: bool,

    /// HTTP method.
    #[arg(short = 'X', long, default_value = "GET")]
    pub method: String,

    /// Print the response body.
    #[arg(short, long)]
    pub body: bool,
}

/// Arguments for the message command.
#[derive(Args)]
pub struct MessageArgs {
    /// Message as JSON, e.g. '{"type":"SKIP_WAITING"}'.
    pub message: String,

    /// Install this version as a waiting worker before posting.
    #[arg(long)]
    pub next: Option<String>,

    /// Fail every network request.
    #[arg(long)]
    pub offline: bool,
}

/// Arguments for the stories command.
#[derive(Args)]
pub struct StoriesArgs {
    #[command(subcommand)]
    pub command: StoriesCommand,
}

#[derive(Subcommand)]
pub enum StoriesCommand {
    /// List stories.
    List,
    /// Play a story interactively.
    Play {
        /// Story id (prompted for when omitted).
        id: Option<String>,
    },
    /// Print a node as paragraph markup.
    Show {
        /// Story id.
        id: String,
        /// Node id.
        #[arg(short, long, default_value = "start")]
        node: String,
    },
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Initialize a new config file.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
        /// Initial version tag.
        #[arg(long, default_value = shelf_core::DEFAULT_VERSION)]
        version: String,
        /// App scope URL.
        #[arg(long, default_value = shelf_core::DEFAULT_SCOPE)]
        scope: String,
    },
    /// Validate the config file.
    Validate,
}
