//! Cache key generation for change-log queries

use crate::client::ChangeLogRequest;
use crate::client::models::format_date;

/// Build the cache key for a change-log query.
///
/// The key is the four identifying fields joined with `:`. App identifiers
/// are reverse-DNS names and never contain `:`, so distinct queries cannot
/// produce the same key.
pub fn cache_key(request: &ChangeLogRequest) -> String {
    format!(
        "{}:{}:{}:{}",
        request.app_id,
        request.store,
        format_date(request.start_date),
        format_date(request.end_date)
    )
}
