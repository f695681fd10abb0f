//! Mock change-log transport for testing
//!
//! Scripts the result of each call so retry, cache and batch behaviour can
//! be tested without a network.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use super::{ChangeLogApi, ChangeLogRequest};
use crate::error::ApiError;

type Scripted = std::result::Result<Value, ApiError>;

/// Mock transport.
///
/// Results are taken from a per-app queue first, then from the shared
/// queue, then from the default. Clones share state, so a test can keep a
/// handle for assertions after moving one into the client.
///
/// # Example
/// ```ignore
/// let mock = MockRankApi::new()
///     .with_responses(vec![Err(ApiError::RateLimited)])
///     .with_default(Ok(json!({ "content": [] })));
/// ```
#[derive(Clone, Default)]
pub struct MockRankApi {
    queue: Arc<Mutex<VecDeque<Scripted>>>,
    per_app: Arc<Mutex<HashMap<String, VecDeque<Scripted>>>>,
    default: Arc<Mutex<Option<Scripted>>>,
    captured_requests: Arc<Mutex<Vec<ChangeLogRequest>>>,
}

impl MockRankApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Results returned in order, for any app
    pub fn with_responses(self, responses: Vec<Scripted>) -> Self {
        if let Ok(mut queue) = self.queue.try_lock() {
            queue.extend(responses);
        }
        self
    }

    /// Results returned in order for one app
    pub fn with_app_responses(self, app_id: &str, responses: Vec<Scripted>) -> Self {
        if let Ok(mut per_app) = self.per_app.try_lock() {
            per_app
                .entry(app_id.to_string())
                .or_default()
                .extend(responses);
        }
        self
    }

    /// Result returned once the queues are empty
    pub fn with_default(self, response: Scripted) -> Self {
        if let Ok(mut default) = self.default.try_lock() {
            *default = Some(response);
        }
        self
    }

    /// Total number of calls made
    pub async fn call_count(&self) -> usize {
        self.captured_requests.lock().await.len()
    }

    /// Number of calls made for one app
    pub async fn calls_for(&self, app_id: &str) -> usize {
        self.captured_requests
            .lock()
            .await
            .iter()
            .filter(|r| r.app_id == app_id)
            .count()
    }

    /// Requests seen so far, in call order
    pub async fn captured_requests(&self) -> Vec<ChangeLogRequest> {
        self.captured_requests.lock().await.clone()
    }
}

#[async_trait]
impl ChangeLogApi for MockRankApi {
    async fn fetch_changes_log(
        &self,
        request: &ChangeLogRequest,
    ) -> std::result::Result<Value, ApiError> {
        self.captured_requests.lock().await.push(request.clone());

        if let Some(next) = self
            .per_app
            .lock()
            .await
            .get_mut(&request.app_id)
            .and_then(VecDeque::pop_front)
        {
            return next;
        }

        if let Some(next) = self.queue.lock().await.pop_front() {
            return next;
        }

        self.default
            .lock()
            .await
            .clone()
            .unwrap_or_else(|| Err(ApiError::Network("no scripted response".to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Store;
    use chrono::NaiveDate;
    use serde_json::json;

    fn request(app: &str) -> ChangeLogRequest {
        let day = NaiveDate::from_ymd_opt(2024, 9, 1).unwrap();
        ChangeLogRequest::new(app, Store::Apple, day, day)
    }

    #[tokio::test]
    async fn test_queue_order_then_default() {
        let mock = MockRankApi::new()
            .with_responses(vec![Err(ApiError::Timeout)])
            .with_app_responses("b", vec![Err(ApiError::Unauthorized)])
            .with_default(Ok(json!({ "content": [] })));

        assert_eq!(
            mock.fetch_changes_log(&request("b")).await,
            Err(ApiError::Unauthorized)
        );
        assert_eq!(
            mock.fetch_changes_log(&request("a")).await,
            Err(ApiError::Timeout)
        );
        assert!(mock.fetch_changes_log(&request("a")).await.is_ok());

        assert_eq!(mock.call_count().await, 3);
        assert_eq!(mock.calls_for("a").await, 2);
        assert_eq!(mock.captured_requests().await[0].app_id, "b");
    }

    #[tokio::test]
    async fn test_unscripted_call_fails() {
        let mock = MockRankApi::new();
        assert!(mock.fetch_changes_log(&request("a")).await.is_err());
    }
}
