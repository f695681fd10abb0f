//! `rankscope validate`: offline shape check of saved change-log JSON

use std::fs;

use serde::Serialize;
use serde_json::Value;
use tabled::Tabled;

use crate::cli::{GlobalOptions, OutputFormat, ValidateArgs};
use crate::client::validate::validate_response;
use crate::error::{Error, Result};
use crate::output::{json, table};

/// Validation result for one document
#[derive(Debug, Tabled, Serialize)]
pub struct ValidationRow {
    #[tabled(rename = "DOCUMENT")]
    pub document: String,

    #[tabled(rename = "RESULT")]
    pub result: String,

    #[tabled(rename = "DETAIL")]
    pub detail: String,

    #[tabled(skip)]
    pub valid: bool,
}

impl ValidationRow {
    fn check(document: &str, body: &Value) -> Self {
        match validate_response(body) {
            Ok(()) => Self {
                document: document.to_string(),
                result: "valid".to_string(),
                detail: String::new(),
                valid: true,
            },
            Err(violation) => Self {
                document: document.to_string(),
                result: violation.code().to_string(),
                detail: violation.to_string(),
                valid: false,
            },
        }
    }
}

/// Validate a single response, or every response in a results mapping
pub fn check_document(body: &Value, batch: bool, name: &str) -> Result<Vec<ValidationRow>> {
    if !batch {
        return Ok(vec![ValidationRow::check(name, body)]);
    }

    let mapping = body.as_object().ok_or_else(|| {
        Error::Other(format!("{} is not a JSON object of app id -> response", name))
    })?;

    Ok(mapping
        .iter()
        .map(|(app, doc)| ValidationRow::check(app, doc))
        .collect())
}

/// Run the validate command
pub fn run(opts: &GlobalOptions, args: ValidateArgs) -> Result<()> {
    let contents = fs::read_to_string(&args.file)?;
    let body: Value = serde_json::from_str(&contents)?;
    let name = args.file.display().to_string();

    let rows = check_document(&body, args.batch, &name)?;
    let invalid = rows.iter().filter(|r| !r.valid).count();

    match opts.format {
        OutputFormat::Json => println!("{}", json::format_json(&rows)?),
        OutputFormat::Table => println!("{}", table::format_table(&rows, "No documents found.")),
    }

    if invalid > 0 {
        return Err(Error::Other(format!(
            "{} of {} document(s) failed validation",
            invalid,
            rows.len()
        )));
    }
    Ok(())
}
