//! Local cache for API responses
//!
//! Keeps validated change-log responses in memory so repeated queries for
//! the same app, store and date range skip the network.

pub mod key;
pub mod storage;

use std::time::Duration;

/// Cache TTL configuration
pub struct CacheTtl;

impl CacheTtl {
    /// Change logs for a closed date range rarely change within a run
    pub const CHANGES_LOG: Duration = Duration::from_secs(60 * 60); // 1 hr
}

// Re-export main types
pub use key::cache_key;
pub use storage::ResponseCache;
