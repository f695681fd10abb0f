//! rankscope - change-log collector for competitor app-store listings

use clap::Parser;

mod cache;
mod cli;
mod client;
mod config;
mod error;
mod logging;
mod output;

use cli::{Cli, Commands, GlobalOptions};
use error::Result;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Version = cli.command {
        println!("rankscope version {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let opts = GlobalOptions::from_cli(&cli);
    let config = opts.load_config()?;
    logging::init(Some(config.log_file.as_path()), opts.debug)?;

    match cli.command {
        Commands::Collect(args) => cli::collect::run(&opts, config, args).await,
        Commands::Fetch(args) => cli::fetch::run(&opts, config, args).await,
        Commands::Validate(args) => cli::validate::run(&opts, args),
        Commands::Status => cli::status::run(&opts, &config),
        Commands::Version => Ok(()),
    }
}
