//! `rankscope status`: resolved configuration at a glance

use colored::Colorize;

use crate::cli::{GlobalOptions, OutputFormat};
use crate::client::Store;
use crate::config::{self, Config, TOKEN_ENV_VAR};
use crate::error::Result;

/// Run the status command
pub fn run(opts: &GlobalOptions, config: &Config) -> Result<()> {
    let config_path = match opts.config_ref() {
        Some(path) => path.to_string(),
        None => Config::default_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| "unknown".to_string()),
    };
    let has_token = config::token_from_env().is_ok();

    match opts.format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "config_path": config_path,
                "token_present": has_token,
                "config": config,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Table => {
            println!();
            println!("rankscope status");
            println!("────────────────────────────────────────");
            println!("Config file:    {}", config_path);

            if has_token {
                println!("{} API token found in {}", "✓".green(), TOKEN_ENV_VAR);
            } else {
                println!("{} {} is not set", "✗".red(), TOKEN_ENV_VAR);
            }

            println!("API host:       {}", config.api_host.cyan());
            println!(
                "Retries:        {} (timeout {}ms, retry delay {}ms, 429 backoff {}ms)",
                config.max_retries,
                config.timeout_ms,
                config.retry_delay_ms,
                config.rate_limit_delay_ms
            );
            println!(
                "Rate:           {}/s, {} concurrent",
                config.calls_per_second, config.max_concurrent
            );
            println!("Cache TTL:      {}s", config.cache_ttl_secs);
            println!("Output dir:     {}", config.output_dir.display());
            println!("Log file:       {}", config.log_file.display());

            for store in Store::ALL {
                let apps = config.apps.for_store(store);
                println!();
                println!("{} apps ({}):", store, apps.len());
                for app in apps {
                    println!("  {}", app.dimmed());
                }
            }
            println!();
        }
    }

    Ok(())
}
