//! Common CLI types shared across commands

use chrono::NaiveDate;
use clap::Args;

use crate::client::Store;
use crate::error::{Error, Result};

/// Output format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Table format - one row per app or record
    #[default]
    Table,
    /// JSON format - structured for scripts
    Json,
}

/// Which stores a command covers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum StoreSelection {
    Apple,
    Google,
    #[default]
    All,
}

impl StoreSelection {
    pub fn stores(&self) -> Vec<Store> {
        match self {
            StoreSelection::Apple => vec![Store::Apple],
            StoreSelection::Google => vec![Store::Google],
            StoreSelection::All => Store::ALL.to_vec(),
        }
    }
}

/// Inclusive date range of a change-log query (YYYY-MM-DD)
#[derive(Debug, Clone, Args)]
pub struct DateRangeArgs {
    /// First day of the range (YYYY-MM-DD)
    #[arg(long)]
    pub start: NaiveDate,

    /// Last day of the range (YYYY-MM-DD)
    #[arg(long)]
    pub end: NaiveDate,
}

impl DateRangeArgs {
    /// Reject ranges that end before they start
    pub fn validate(&self) -> Result<()> {
        if self.start > self.end {
            return Err(Error::Other(format!(
                "start date {} is after end date {}",
                self.start, self.end
            )));
        }
        Ok(())
    }
}
