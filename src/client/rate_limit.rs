//! Client-side rate limiting for the change-log API
//!
//! Spaces admitted calls at least `1 / calls_per_second` apart. The limiter
//! is a GCRA with a burst of one, so the spacing holds even when many
//! fetches wait on it concurrently. The API's own 429 responses remain the
//! backstop.

use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as GovernorLimiter};
use log::debug;

use crate::error::{ConfigError, Result};

/// Minimum-interval limiter shared by every call made through one client.
pub struct RateLimiter {
    limiter: GovernorLimiter<NotKeyed, InMemoryState, DefaultClock>,
    interval: Duration,
}

impl RateLimiter {
    /// Create a limiter admitting `calls_per_second` requests per second.
    pub fn new(calls_per_second: f64) -> Result<Self> {
        if !calls_per_second.is_finite() || calls_per_second <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "calls_per_second must be a positive number, got {}",
                calls_per_second
            ))
            .into());
        }

        let unschedulable = || {
            ConfigError::Invalid(format!(
                "calls_per_second {} cannot be scheduled",
                calls_per_second
            ))
        };
        let interval =
            Duration::try_from_secs_f64(1.0 / calls_per_second).map_err(|_| unschedulable())?;
        let quota = Quota::with_period(interval).ok_or_else(unschedulable)?;

        Ok(Self {
            limiter: GovernorLimiter::direct(quota),
            interval,
        })
    }

    /// Minimum spacing between admitted calls
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Suspend until the next call may be issued, then claim the slot.
    pub async fn wait(&self) {
        if self.limiter.check().is_ok() {
            return;
        }
        debug!("Rate limiter engaged, waiting up to {:?}", self.interval);
        self.limiter.until_ready().await;
    }
}
