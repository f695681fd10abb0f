//! Configuration management for rankscope

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cache::CacheTtl;
use crate::client::Store;
use crate::error::{ConfigError, Result};

/// Production change-log API base URL
pub const DEFAULT_API_HOST: &str = "https://api.rankmyapp.com/v1";

/// Environment variable holding the API token
pub const TOKEN_ENV_VAR: &str = "RANKAPI_TOKEN";

/// Application configuration
///
/// Every key is optional in the YAML file; missing keys take the defaults
/// below.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the change-log API
    pub api_host: String,

    /// Attempts per app before giving up
    pub max_retries: u32,

    /// Per-request timeout
    pub timeout_ms: u64,

    /// Sleep between failed attempts
    pub retry_delay_ms: u64,

    /// Extra sleep after an HTTP 429
    pub rate_limit_delay_ms: u64,

    /// Lifetime of a cached, validated response
    pub cache_ttl_secs: u64,

    /// Client-side request rate
    pub calls_per_second: f64,

    /// Maximum in-flight fetches per batch
    pub max_concurrent: usize,

    /// Directory for persisted results
    pub output_dir: PathBuf,

    /// Log file (appended to)
    pub log_file: PathBuf,

    /// App identifiers to collect, per store
    pub apps: AppLists,
}

/// Competitor app identifiers per store
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppLists {
    pub apple: Vec<String>,
    pub google: Vec<String>,
}

impl AppLists {
    /// App identifiers configured for a store
    pub fn for_store(&self, store: Store) -> &[String] {
        match store {
            Store::Apple => &self.apple,
            Store::Google => &self.google,
        }
    }
}

impl Default for AppLists {
    fn default() -> Self {
        let to_vec = |ids: &[&str]| -> Vec<String> { ids.iter().map(|s| s.to_string()).collect() };
        Self {
            apple: to_vec(&[
                "br.com.bradescora.app",
                "com.itau.iphone.varejo",
                "br.com.Neon",
                "com.bb.bbapp",
                "com.nu.iphone",
            ]),
            google: to_vec(&[
                "com.itau",
                "com.bradesco",
                "com.nu.production",
                "br.com.neon",
                "br.com.bb.android",
            ]),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_host: DEFAULT_API_HOST.to_string(),
            max_retries: 3,
            timeout_ms: 10_000,
            retry_delay_ms: 1_000,
            rate_limit_delay_ms: 5_000,
            cache_ttl_secs: CacheTtl::CHANGES_LOG.as_secs(),
            calls_per_second: 1.0,
            max_concurrent: 8,
            output_dir: PathBuf::from("data"),
            log_file: PathBuf::from("logs").join("api_errors.log"),
            apps: AppLists::default(),
        }
    }
}

impl Config {
    /// Get the default config file path (~/.rankscope/config.yaml)
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;

        Ok(home.join(".rankscope").join("config.yaml"))
    }

    /// Load configuration from an explicit path, or from the default path.
    ///
    /// A missing file at the default path yields the defaults; a missing
    /// file at an explicit path is an error.
    pub fn load_at(path: Option<&str>) -> Result<Self> {
        let config = match path {
            Some(p) => Self::load_from(Path::new(p))?,
            None => {
                let default = Self::default_path()?;
                if default.exists() {
                    Self::load_from(&default)?
                } else {
                    Self::default()
                }
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()).into());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;

        Ok(config)
    }

    /// Reject values the client cannot work with
    pub fn validate(&self) -> Result<()> {
        if !self.calls_per_second.is_finite() || self.calls_per_second <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "calls_per_second must be a positive number, got {}",
                self.calls_per_second
            ))
            .into());
        }
        if self.max_concurrent == 0 {
            return Err(ConfigError::Invalid("max_concurrent must be at least 1".to_string()).into());
        }
        if self.api_host.trim().is_empty() {
            return Err(ConfigError::Invalid("api_host must not be empty".to_string()).into());
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn rate_limit_delay(&self) -> Duration {
        Duration::from_millis(self.rate_limit_delay_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

/// Read the API token from the environment.
///
/// Called once at startup; the value is then handed to the client.
pub fn token_from_env() -> Result<String> {
    match std::env::var(TOKEN_ENV_VAR) {
        Ok(token) if !token.trim().is_empty() => Ok(token),
        _ => Err(ConfigError::MissingToken.into()),
    }
}
