//! Change-log data models
//!
//! Request identity plus the response document returned by the
//! `changes-log` endpoint. Record values are kept as raw JSON since the API
//! mixes strings, numbers and objects in `previousValue` / `currentValue`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// App store a listing belongs to
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Store {
    Apple,
    Google,
}

impl Store {
    pub const ALL: [Store; 2] = [Store::Apple, Store::Google];

    /// Path/query representation used by the API
    pub fn as_str(&self) -> &'static str {
        match self {
            Store::Apple => "apple",
            Store::Google => "google",
        }
    }
}

impl fmt::Display for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Store {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "apple" => Ok(Store::Apple),
            "google" => Ok(Store::Google),
            other => Err(format!("unknown store '{}'", other)),
        }
    }
}

/// Identifies one change-log query
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChangeLogRequest {
    pub app_id: String,
    pub store: Store,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl ChangeLogRequest {
    pub fn new(
        app_id: impl Into<String>,
        store: Store,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            app_id: app_id.into(),
            store,
            start_date,
            end_date,
        }
    }

    /// Query parameters in the order the API documents them
    pub fn query_params(&self) -> [(&'static str, String); 3] {
        [
            ("store", self.store.as_str().to_string()),
            ("startDate", format_date(self.start_date)),
            ("endDate", format_date(self.end_date)),
        ]
    }
}

/// Dates travel as `YYYY-MM-DD`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Validated change-log document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeLogResponse {
    pub content: Vec<ChangeEntry>,

    /// Paging and other metadata the API sends alongside `content`
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChangeLogResponse {
    /// Total number of change records across all entries
    pub fn change_count(&self) -> usize {
        self.content.iter().map(|e| e.changes.len()).sum()
    }

    /// Iterate over every change record in document order
    pub fn records(&self) -> impl Iterator<Item = &ChangeRecord> {
        self.content.iter().flat_map(|e| e.changes.iter())
    }
}

/// One observed snapshot transition, grouping its field-level changes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEntry {
    pub changes: Vec<ChangeRecord>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single field-level diff of an app-store listing
///
/// The record id is read from `_id`. A plain `id` key is kept in `extra`,
/// whether or not `_id` is also present, so records carrying either key or
/// both decode and serialize back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRecord {
    #[serde(rename = "_id", default, skip_serializing_if = "Value::is_null")]
    pub id: Value,

    pub date: Value,

    pub field: Value,

    pub previous_value: Value,

    pub current_value: Value,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChangeRecord {
    /// Change timestamp when sent as an RFC 3339 string
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.date
            .as_str()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }
}
