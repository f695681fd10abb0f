//! `rankscope collect`: batch change-log collection per store

use std::path::PathBuf;

use colored::Colorize;
use serde::Serialize;
use tabled::Tabled;

use crate::cli::{CollectArgs, CommandContext, GlobalOptions, OutputFormat};
use crate::client::{AppConsultant, BatchReport, FetchOutcome, Store};
use crate::config::Config;
use crate::error::Result;
use crate::output::{json, table};

/// One app's row in the collection summary
#[derive(Debug, Tabled, Serialize)]
pub struct AppSummary {
    #[tabled(rename = "APP")]
    pub app: String,

    #[tabled(rename = "STORE")]
    pub store: Store,

    #[tabled(rename = "STATUS")]
    pub status: &'static str,

    #[tabled(rename = "ATTEMPTS")]
    pub attempts: u32,

    #[tabled(rename = "ENTRIES")]
    pub entries: usize,

    #[tabled(rename = "CHANGES")]
    pub changes: usize,

    #[tabled(rename = "DETAIL", display = "display_detail")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    #[tabled(skip)]
    #[serde(skip)]
    pub succeeded: bool,
}

fn display_detail(detail: &Option<String>) -> String {
    detail.clone().unwrap_or_default()
}

impl AppSummary {
    fn new(app: &str, store: Store, outcome: &FetchOutcome) -> Self {
        let (entries, changes) = outcome
            .response()
            .map(|r| (r.content.len(), r.change_count()))
            .unwrap_or((0, 0));

        let detail = match outcome {
            FetchOutcome::Exhausted {
                last_failure: Some(reason),
                ..
            } => Some(reason.to_string()),
            FetchOutcome::Unauthorized => Some("check RANKAPI_TOKEN".to_string()),
            _ => None,
        };

        Self {
            app: app.to_string(),
            store,
            status: outcome.status_label(),
            attempts: outcome.attempts(),
            entries,
            changes,
            detail,
            succeeded: outcome.is_success(),
        }
    }
}

/// Summary rows for a batch, in app-id order
pub fn summarize(report: &BatchReport) -> Vec<AppSummary> {
    report
        .outcomes
        .iter()
        .map(|(app, outcome)| AppSummary::new(app, report.store, outcome))
        .collect()
}

#[derive(Serialize)]
struct CollectOutput {
    files: Vec<PathBuf>,
    apps: Vec<AppSummary>,
}

/// Run the collect command
pub async fn run(opts: &GlobalOptions, config: Config, args: CollectArgs) -> Result<()> {
    args.range.validate()?;
    let ctx = CommandContext::new(opts.format, config)?;
    let consultant = AppConsultant::new(&ctx.client, ctx.config.max_concurrent);

    let mut files = Vec::new();
    let mut rows = Vec::new();

    for store in args.store.stores() {
        let apps = if args.apps.is_empty() {
            ctx.config.apps.for_store(store).to_vec()
        } else {
            args.apps.clone()
        };

        let report = consultant
            .consult_apps_detailed(&apps, store, args.range.start, args.range.end)
            .await;

        let path = json::save_results(&report.successes(), &ctx.config.output_dir, store)?;
        files.push(path);
        rows.extend(summarize(&report));
    }

    match ctx.format {
        OutputFormat::Json => {
            let output = CollectOutput { files, apps: rows };
            println!("{}", json::format_json(&output)?);
        }
        OutputFormat::Table => {
            println!("{}", table::format_table(&rows, "No apps to collect."));

            let failed = rows.iter().filter(|r| !r.succeeded).count();
            for path in &files {
                println!("{} Saved {}", "✓".green(), path.display());
            }
            if failed > 0 {
                println!(
                    "{} {} app(s) returned no data; see {}",
                    "!".yellow(),
                    failed,
                    ctx.config.log_file.display()
                );
            }
        }
    }

    Ok(())
}
