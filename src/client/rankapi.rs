//! HTTP transport for the RankMyApp change-log endpoint

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::{Client as HttpClient, StatusCode, Url};
use serde_json::Value;

use super::{ChangeLogApi, ChangeLogRequest};
use crate::config::DEFAULT_API_HOST;
use crate::error::{ApiError, ConfigError, Result};

/// Header carrying the API token
const TOKEN_HEADER: &str = "rankapi-token";

/// reqwest-backed change-log transport
pub struct RankApiClient {
    http: HttpClient,
    base_url: Url,
    token: String,
}

impl RankApiClient {
    /// Create a client with an optional custom API host (tests, staging).
    ///
    /// `None` targets the production API.
    pub fn with_host(token: String, api_host: Option<&str>, timeout: Duration) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let host = api_host.unwrap_or(DEFAULT_API_HOST);
        let base_url = Url::parse(host.trim_end_matches('/'))
            .map_err(|e| ConfigError::Invalid(format!("api_host '{}': {}", host, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::Invalid(format!("api_host '{}' is not a base URL", host)).into());
        }

        Ok(Self {
            http,
            base_url,
            token,
        })
    }

    /// Endpoint URL for a request (query string excluded).
    ///
    /// Each path segment is percent-encoded, so an app id cannot add
    /// segments, a query or a fragment.
    fn changes_log_url(&self, request: &ChangeLogRequest) -> Url {
        let mut url = self.base_url.clone();
        // Always Ok: base URLs are checked in the constructor
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend([
                "apps",
                request.app_id.as_str(),
                request.store.as_str(),
                "changes-log",
            ]);
        }
        url
    }
}

#[async_trait]
impl ChangeLogApi for RankApiClient {
    async fn fetch_changes_log(
        &self,
        request: &ChangeLogRequest,
    ) -> std::result::Result<Value, ApiError> {
        let url = self.changes_log_url(request);
        debug!("GET {}", url);

        let response = self
            .http
            .get(url)
            .header(TOKEN_HEADER, &self.token)
            .query(&request.query_params())
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => response.json::<Value>().await.map_err(|e| {
                if e.is_timeout() {
                    ApiError::Timeout
                } else {
                    ApiError::InvalidResponse(format!("Failed to parse response: {}", e))
                }
            }),
            StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized),
            StatusCode::TOO_MANY_REQUESTS => Err(ApiError::RateLimited),
            status => Err(ApiError::UnexpectedStatus(status.as_u16())),
        }
    }
}
