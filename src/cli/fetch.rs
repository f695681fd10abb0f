//! `rankscope fetch`: change log of a single app

use serde_json::Value;
use tabled::Tabled;

use crate::cli::{CommandContext, FetchArgs, GlobalOptions, OutputFormat};
use crate::client::{ChangeLogRequest, ChangeLogResponse, FetchOutcome};
use crate::client::models::ChangeRecord;
use crate::config::Config;
use crate::error::{ApiError, Error, Result};
use crate::output::{json, table};

/// Longest value shown in a table cell before truncation
const MAX_CELL_CHARS: usize = 48;

/// Display format for change records in table view
#[derive(Tabled)]
struct ChangeDisplay {
    #[tabled(rename = "DATE")]
    date: String,

    #[tabled(rename = "FIELD")]
    field: String,

    #[tabled(rename = "PREVIOUS")]
    previous: String,

    #[tabled(rename = "CURRENT")]
    current: String,
}

impl From<&ChangeRecord> for ChangeDisplay {
    fn from(record: &ChangeRecord) -> Self {
        let date = record
            .timestamp()
            .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| cell(&record.date));

        Self {
            date,
            field: cell(&record.field),
            previous: cell(&record.previous_value),
            current: cell(&record.current_value),
        }
    }
}

/// Render a JSON value for a table cell, strings unquoted
fn cell(value: &Value) -> String {
    let text = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    if text.chars().count() > MAX_CELL_CHARS {
        let cut: String = text.chars().take(MAX_CELL_CHARS - 1).collect();
        format!("{}…", cut)
    } else {
        text
    }
}

fn render_table(response: &ChangeLogResponse) -> String {
    let rows: Vec<ChangeDisplay> = response.records().map(ChangeDisplay::from).collect();
    table::format_table(&rows, "No changes in this period.")
}

/// Run the fetch command
pub async fn run(opts: &GlobalOptions, config: Config, args: FetchArgs) -> Result<()> {
    args.range.validate()?;
    let ctx = CommandContext::new(opts.format, config)?;
    let request = ChangeLogRequest::new(
        args.app_id,
        args.store,
        args.range.start,
        args.range.end,
    );

    let response = match ctx.client.fetch_changes_log(&request).await {
        FetchOutcome::Fresh { response, .. } | FetchOutcome::Cached(response) => response,
        FetchOutcome::Unauthorized => return Err(ApiError::Unauthorized.into()),
        FetchOutcome::Exhausted {
            attempts,
            last_failure,
        } => {
            let reason = last_failure
                .map(|r| r.to_string())
                .unwrap_or_else(|| "no attempts made".to_string());
            return Err(Error::Other(format!(
                "No change log for {} after {} attempt(s) (last failure: {})",
                request.app_id, attempts, reason
            )));
        }
    };

    match ctx.format {
        OutputFormat::Json => println!("{}", json::to_pretty_string(&response)?),
        OutputFormat::Table => println!("{}", render_table(&response)),
    }

    Ok(())
}
