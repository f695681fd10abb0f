//! Change-log client: cache, rate limiting, retries and validation around a
//! [`ChangeLogApi`] transport.
//!
//! Every failure is absorbed here. Callers get a [`FetchOutcome`] (or the
//! plain `Option` from [`ChangeLogClient::get_changes_log`]) and the log
//! file is the only other trace of what went wrong.

use std::time::Duration;

use log::{debug, error, info, warn};
use serde::Serialize;

use super::models::{ChangeLogRequest, ChangeLogResponse};
use super::rate_limit::RateLimiter;
use super::validate::validate_response;
use super::ChangeLogApi;
use crate::cache::{CacheTtl, ResponseCache, cache_key};
use crate::config::Config;
use crate::error::{ApiError, Result};

/// Retry and caching knobs for [`ChangeLogClient`]
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Attempts per request
    pub max_retries: u32,
    /// Sleep between failed attempts
    pub retry_delay: Duration,
    /// Extra sleep after an HTTP 429
    pub rate_limit_delay: Duration,
    /// Lifetime of cached responses
    pub cache_ttl: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay: Duration::from_secs(1),
            rate_limit_delay: Duration::from_secs(5),
            cache_ttl: CacheTtl::CHANGES_LOG,
        }
    }
}

impl From<&Config> for RetryPolicy {
    fn from(config: &Config) -> Self {
        Self {
            max_retries: config.max_retries,
            retry_delay: config.retry_delay(),
            rate_limit_delay: config.rate_limit_delay(),
            cache_ttl: config.cache_ttl(),
        }
    }
}

/// Why an attempt did not produce a usable response
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "kebab-case")]
pub enum FailureReason {
    RateLimited,
    Timeout,
    Network(String),
    UnexpectedStatus(u16),
    InvalidResponse(String),
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureReason::RateLimited => write!(f, "rate limited"),
            FailureReason::Timeout => write!(f, "timeout"),
            FailureReason::Network(msg) => write!(f, "network error: {}", msg),
            FailureReason::UnexpectedStatus(code) => write!(f, "HTTP {}", code),
            FailureReason::InvalidResponse(msg) => write!(f, "invalid response: {}", msg),
        }
    }
}

/// Result of fetching one app's change log
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// Fetched and validated on attempt number `attempts`
    Fresh {
        response: ChangeLogResponse,
        attempts: u32,
    },
    /// Served from the cache without touching the network
    Cached(ChangeLogResponse),
    /// The API rejected the token; never retried
    Unauthorized,
    /// Every attempt failed
    Exhausted {
        attempts: u32,
        last_failure: Option<FailureReason>,
    },
}

impl FetchOutcome {
    pub fn response(&self) -> Option<&ChangeLogResponse> {
        match self {
            FetchOutcome::Fresh { response, .. } | FetchOutcome::Cached(response) => Some(response),
            _ => None,
        }
    }

    pub fn into_response(self) -> Option<ChangeLogResponse> {
        match self {
            FetchOutcome::Fresh { response, .. } | FetchOutcome::Cached(response) => Some(response),
            _ => None,
        }
    }

    /// Network attempts made (zero for cache hits)
    pub fn attempts(&self) -> u32 {
        match self {
            FetchOutcome::Fresh { attempts, .. } | FetchOutcome::Exhausted { attempts, .. } => {
                *attempts
            }
            FetchOutcome::Cached(_) => 0,
            FetchOutcome::Unauthorized => 1,
        }
    }

    pub fn is_success(&self) -> bool {
        self.response().is_some()
    }

    /// Short status label for summaries
    pub fn status_label(&self) -> &'static str {
        match self {
            FetchOutcome::Fresh { .. } => "fetched",
            FetchOutcome::Cached(_) => "cached",
            FetchOutcome::Unauthorized => "unauthorized",
            FetchOutcome::Exhausted { .. } => "failed",
        }
    }
}

/// What the retry loop does after one attempt
enum Attempt {
    Success(ChangeLogResponse),
    Terminal,
    Retry(FailureReason),
}

/// Change-log client over any transport.
pub struct ChangeLogClient<C: ChangeLogApi> {
    api: C,
    cache: ResponseCache<ChangeLogResponse>,
    limiter: RateLimiter,
    policy: RetryPolicy,
}

impl<C: ChangeLogApi> ChangeLogClient<C> {
    pub fn new(api: C, limiter: RateLimiter, policy: RetryPolicy) -> Self {
        Self {
            api,
            cache: ResponseCache::new(),
            limiter,
            policy,
        }
    }

    /// Build a client from loaded configuration
    pub fn from_config(api: C, config: &Config) -> Result<Self> {
        let limiter = RateLimiter::new(config.calls_per_second)?;
        Ok(Self::new(api, limiter, RetryPolicy::from(config)))
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    #[cfg(test)]
    pub fn cache(&self) -> &ResponseCache<ChangeLogResponse> {
        &self.cache
    }

    /// Fetch a change log, returning `None` on any failure.
    #[allow(dead_code)]
    pub async fn get_changes_log(&self, request: &ChangeLogRequest) -> Option<ChangeLogResponse> {
        self.fetch_changes_log(request).await.into_response()
    }

    /// Fetch a change log with the configured retry budget.
    pub async fn fetch_changes_log(&self, request: &ChangeLogRequest) -> FetchOutcome {
        self.fetch_with_retries(request, self.policy.max_retries)
            .await
    }

    /// Fetch a change log with an explicit retry budget.
    pub async fn fetch_with_retries(
        &self,
        request: &ChangeLogRequest,
        max_retries: u32,
    ) -> FetchOutcome {
        let key = cache_key(request);
        if let Some(cached) = self.cache.get(&key) {
            debug!("Cache hit: {}", key);
            return FetchOutcome::Cached(cached);
        }

        let app_id = &request.app_id;
        let mut last_failure = None;

        for attempt in 1..=max_retries {
            self.limiter.wait().await;

            match self.attempt(request).await {
                Attempt::Success(response) => {
                    self.cache.set(&key, response.clone(), self.policy.cache_ttl);
                    info!(
                        "Fetched change log for {} ({} changes, attempt {})",
                        app_id,
                        response.change_count(),
                        attempt
                    );
                    return FetchOutcome::Fresh {
                        response,
                        attempts: attempt,
                    };
                }
                Attempt::Terminal => {
                    error!("Authentication error querying {}", app_id);
                    return FetchOutcome::Unauthorized;
                }
                Attempt::Retry(reason) => {
                    if reason == FailureReason::RateLimited {
                        tokio::time::sleep(self.policy.rate_limit_delay).await;
                    }
                    last_failure = Some(reason);
                }
            }

            if attempt < max_retries {
                tokio::time::sleep(self.policy.retry_delay).await;
            }
        }

        error!(
            "Failed to query {} after {} attempts",
            app_id, max_retries
        );
        FetchOutcome::Exhausted {
            attempts: max_retries,
            last_failure,
        }
    }

    /// One rate-limited exchange plus validation
    async fn attempt(&self, request: &ChangeLogRequest) -> Attempt {
        let app_id = &request.app_id;

        let body = match self.api.fetch_changes_log(request).await {
            Ok(body) => body,
            Err(ApiError::Unauthorized) => return Attempt::Terminal,
            Err(ApiError::RateLimited) => {
                warn!("Rate limit hit for {}", app_id);
                return Attempt::Retry(FailureReason::RateLimited);
            }
            Err(ApiError::Timeout) => {
                warn!("Timeout querying {}", app_id);
                return Attempt::Retry(FailureReason::Timeout);
            }
            Err(ApiError::UnexpectedStatus(code)) => {
                error!("Error querying {}: HTTP {}", app_id, code);
                return Attempt::Retry(FailureReason::UnexpectedStatus(code));
            }
            Err(ApiError::Network(msg)) => {
                error!("Unexpected error querying {}: {}", app_id, msg);
                return Attempt::Retry(FailureReason::Network(msg));
            }
            Err(ApiError::InvalidResponse(msg)) => {
                error!("Unreadable response for {}: {}", app_id, msg);
                return Attempt::Retry(FailureReason::InvalidResponse(msg));
            }
        };

        if let Err(violation) = validate_response(&body) {
            error!(
                "Validation failed for {} [{}]: {}",
                app_id,
                violation.code(),
                violation
            );
            return Attempt::Retry(FailureReason::InvalidResponse(violation.code().to_string()));
        }

        match serde_json::from_value::<ChangeLogResponse>(body) {
            Ok(response) => Attempt::Success(response),
            Err(e) => {
                error!("Failed to decode change log for {}: {}", app_id, e);
                Attempt::Retry(FailureReason::InvalidResponse(e.to_string()))
            }
        }
    }
}
