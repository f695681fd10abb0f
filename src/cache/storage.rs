//! In-memory response cache with per-entry TTL
//!
//! Entries live for the lifetime of the process. Expired entries are only
//! removed when a lookup touches them; there is no background sweep and no
//! capacity bound.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// A cached value and the instant it stops being served
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

/// Thread-safe TTL cache keyed by string
#[derive(Debug)]
pub struct ResponseCache<V> {
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
}

impl<V> Default for ResponseCache<V> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<V: Clone> ResponseCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a value if it has not expired; an expired entry is removed.
    pub fn get(&self, key: &str) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    /// Store a value for `ttl`, replacing any previous entry for `key`.
    pub fn set(&self, key: &str, value: V, ttl: Duration) {
        self.set_at(key, value, ttl, Instant::now());
    }

    fn get_at(&self, key: &str, now: Instant) -> Option<V> {
        let mut entries = self.lock();
        match entries.get(key) {
            Some(entry) if now < entry.expires_at => Some(entry.value.clone()),
            Some(_) => {
                log::debug!("Cache entry expired: {}", key);
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn set_at(&self, key: &str, value: V, ttl: Duration, now: Instant) {
        let entry = CacheEntry {
            value,
            expires_at: now + ttl,
        };
        self.lock().insert(key.to_string(), entry);
    }

    /// Number of stored entries, expired ones included
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, CacheEntry<V>>> {
        // A panic while holding the lock cannot leave the map half-updated
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
