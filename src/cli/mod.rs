//! CLI command definitions and handlers

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

pub mod args;
pub mod collect;
pub mod context;
pub mod fetch;
pub mod status;
pub mod validate;

pub use args::{DateRangeArgs, GlobalOptions, OutputFormat, StoreSelection};
pub use context::CommandContext;

use crate::client::Store;

/// rankscope - change-log collector for competitor app-store listings
#[derive(Parser, Debug)]
#[command(name = "rankscope")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (table, json)
    #[arg(
        long,
        global = true,
        env = "RANKSCOPE_FORMAT",
        default_value = "table",
        hide_env = true,
        hide_possible_values = true
    )]
    pub format: OutputFormat,

    /// Override config file location
    #[arg(long, global = true, env = "RANKSCOPE_CONFIG", hide_env = true)]
    pub config: Option<String>,

    /// Override the API base URL
    #[arg(long, global = true, env = "RANKSCOPE_API_HOST", hide_env = true)]
    pub api_host: Option<String>,

    /// Override the log file location
    #[arg(long, global = true, env = "RANKSCOPE_LOG_FILE", hide_env = true)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true, env = "RANKSCOPE_DEBUG", hide_env = true)]
    pub debug: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Collect change logs for every configured app and save them per store
    Collect(CollectArgs),

    /// Fetch the change log of a single app
    Fetch(FetchArgs),

    /// Check saved change-log JSON against the expected response shape
    Validate(ValidateArgs),

    /// Show resolved configuration
    Status,

    /// Display version information
    Version,
}

/// Arguments for `rankscope collect`
#[derive(Debug, Args)]
pub struct CollectArgs {
    #[command(flatten)]
    pub range: DateRangeArgs,

    /// Store(s) to collect
    #[arg(long, value_enum, default_value = "all")]
    pub store: StoreSelection,

    /// Comma-separated app ids, replacing the configured lists
    #[arg(long, value_delimiter = ',')]
    pub apps: Vec<String>,
}

/// Arguments for `rankscope fetch`
#[derive(Debug, Args)]
pub struct FetchArgs {
    /// App identifier (bundle id or package name)
    pub app_id: String,

    /// Store the app is listed in
    #[arg(long, value_enum)]
    pub store: Store,

    #[command(flatten)]
    pub range: DateRangeArgs,
}

/// Arguments for `rankscope validate`
#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// JSON file to check
    pub file: PathBuf,

    /// Treat the file as a saved results mapping (app id -> response)
    #[arg(long)]
    pub batch: bool,
}
