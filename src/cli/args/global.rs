//! Global CLI options shared across all commands

use std::path::PathBuf;

use crate::cli::{Cli, OutputFormat};
use crate::config::Config;
use crate::error::Result;

/// Global CLI options passed to all command handlers.
///
/// Precedence is CLI flag > environment variable > config file > default.
/// This struct captures the CLI/env layer; [`GlobalOptions::load_config`]
/// merges it over the config file.
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    /// Output format (table, json)
    pub format: OutputFormat,

    /// Custom config file path (defaults to ~/.rankscope/config.yaml)
    pub config: Option<String>,

    /// Custom API host for development/testing
    pub api_host: Option<String>,

    /// Log file override
    pub log_file: Option<PathBuf>,

    /// Log at debug level
    pub debug: bool,
}

impl GlobalOptions {
    /// Create GlobalOptions from a parsed CLI struct.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            format: cli.format,
            config: cli.config.clone(),
            api_host: cli.api_host.clone(),
            log_file: cli.log_file.clone(),
            debug: cli.debug,
        }
    }

    pub fn config_ref(&self) -> Option<&str> {
        self.config.as_deref()
    }

    /// Load the config file and apply CLI overrides on top
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_at(self.config_ref())?;
        self.apply_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut Config) {
        if let Some(ref host) = self.api_host {
            config.api_host = host.clone();
        }
        if let Some(ref path) = self.log_file {
            config.log_file = path.clone();
        }
    }
}
