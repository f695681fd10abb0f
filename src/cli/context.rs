//! Command execution context
//!
//! Builds the live change-log client from configuration and the
//! environment token, so handlers that fetch data share one setup path.

use crate::cli::OutputFormat;
use crate::client::{ChangeLogClient, RankApiClient};
use crate::config::{self, Config};
use crate::error::Result;

/// Context for commands that talk to the API.
pub struct CommandContext {
    /// Resolved configuration (file + CLI overrides)
    pub config: Config,
    /// Rate-limited, caching, retrying change-log client
    pub client: ChangeLogClient<RankApiClient>,
    /// Output format preference
    pub format: OutputFormat,
}

impl CommandContext {
    /// Create a context, reading the API token from the environment.
    ///
    /// # Errors
    /// Returns `ConfigError::MissingToken` when `RANKAPI_TOKEN` is unset.
    pub fn new(format: OutputFormat, config: Config) -> Result<Self> {
        let token = config::token_from_env()?;
        Self::with_token(format, config, token)
    }

    /// Create a context with an explicit token.
    pub fn with_token(format: OutputFormat, config: Config, token: String) -> Result<Self> {
        let api = RankApiClient::with_host(token, Some(&config.api_host), config.timeout())?;
        let client = ChangeLogClient::from_config(api, &config)?;

        log::debug!(
            "Client ready: host={} retries={} rate={}/s",
            config.api_host,
            client.policy().max_retries,
            config.calls_per_second
        );

        Ok(Self {
            config,
            client,
            format,
        })
    }
}
