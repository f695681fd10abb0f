//! JSON output: persisted result files and pretty-printed stdout payloads

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::client::Store;
use crate::error::Result;

/// Wrapper for JSON stdout output with metadata
#[derive(Debug, Serialize)]
pub struct JsonOutput<T> {
    pub data: T,
    pub meta: Metadata,
}

/// Metadata included in JSON output
#[derive(Debug, Serialize)]
pub struct Metadata {
    pub timestamp: String,
    pub version: String,
}

impl<T> JsonOutput<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            meta: Metadata {
                timestamp: Utc::now().to_rfc3339(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        }
    }
}

/// Format data as pretty-printed JSON wrapped with metadata
pub fn format_json<T: Serialize + ?Sized>(data: &T) -> std::result::Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&JsonOutput::new(data))
}

/// Serialize with four-space indentation.
///
/// serde_json writes non-ASCII characters as-is, so Portuguese listing text
/// stays readable in the saved files.
pub fn to_pretty_string<T: Serialize + ?Sized>(data: &T) -> std::result::Result<String, serde_json::Error> {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    data.serialize(&mut ser)?;
    // serde_json only emits valid UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// File name used for one store's batch results
pub fn results_file_name(store: Store) -> String {
    format!("changeslog_{}_results.json", store)
}

/// Write a store's results mapping to `{dir}/changeslog_{store}_results.json`.
///
/// Creates `dir` if needed and returns the written path.
pub fn save_results<T: Serialize + ?Sized>(results: &T, dir: &Path, store: Store) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(results_file_name(store));
    fs::write(&path, to_pretty_string(results)?)?;
    log::info!("Saved results to {}", path.display());
    Ok(path)
}
