//! RankMyApp change-log API client

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ApiError;

pub mod changes;
pub mod consultant;
#[cfg(test)]
pub mod mock;
pub mod models;
pub mod rankapi;
pub mod rate_limit;
pub mod validate;

pub use changes::{ChangeLogClient, FetchOutcome};
pub use consultant::{AppConsultant, BatchReport};
pub use models::{ChangeLogRequest, ChangeLogResponse, Store};
pub use rankapi::RankApiClient;

/// Change-log transport.
///
/// One call is one HTTP exchange: no retries, no caching, no validation.
/// Status codes are classified into [`ApiError`] variants so the client can
/// decide what to retry.
#[async_trait]
pub trait ChangeLogApi: Send + Sync {
    /// Fetch the raw change-log body for one app, store and date range
    async fn fetch_changes_log(
        &self,
        request: &ChangeLogRequest,
    ) -> std::result::Result<Value, ApiError>;
}
