//! Process-scoped key/value cache with lazy TTL expiry

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// A cached value with its absolute expiry
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    pub expires_at: Instant,
}

impl<V> CacheEntry<V> {
    /// Whether the entry is still visible at `now`
    pub fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Key/value store with expiration-on-read
///
/// There is no background sweep: an expired entry is removed by the first
/// `get` that encounters it. Writes are last-write-wins. The store is
/// unbounded; callers are expected to keep the key space small.
///
/// Time is read from `tokio::time::Instant`, so paused test clocks apply.
#[derive(Debug)]
pub struct TtlCache<V> {
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
}

impl<V: Clone> TtlCache<V> {
    /// Create an empty cache
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Store `value` under `key` until `now + ttl`, replacing any existing entry
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let key = key.into();
        let expires_at = Instant::now() + ttl;
        debug!(key = %key, ttl_secs = ttl.as_secs(), "cache set");
        self.lock().insert(key, CacheEntry { value, expires_at });
    }

    /// Get a live value, evicting the entry if it has expired
    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        let mut entries = self.lock();

        match entries.get(key) {
            Some(entry) if entry.is_live(now) => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                debug!(key = %key, "cache entry expired");
                None
            }
            None => None,
        }
    }

    /// Number of stored entries, including expired ones not yet read
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check if the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry<V>>> {
        // Entries stay consistent even if a holder panicked; no invariant spans two calls.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_value_visible_before_expiry() {
        let cache = TtlCache::new();
        cache.set("industryStats:fintech", 42, Duration::from_secs(1));

        tokio::time::advance(Duration::from_millis(999)).await;
        assert_eq!(cache.get("industryStats:fintech"), Some(42));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entry_is_absent_and_removed() {
        let cache = TtlCache::new();
        cache.set("k", "v".to_string(), Duration::from_secs(1));
        assert_eq!(cache.len(), 1);

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(cache.get("k"), None);
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_overwrites_and_resets_expiry() {
        let cache = TtlCache::new();
        cache.set("k", 1, Duration::from_secs(1));
        tokio::time::advance(Duration::from_millis(800)).await;
        cache.set("k", 2, Duration::from_secs(1));
        tokio::time::advance(Duration::from_millis(800)).await;

        assert_eq!(cache.get("k"), Some(2));
    }

    #[test]
    fn test_missing_key() {
        let cache: TtlCache<u8> = TtlCache::default();
        assert_eq!(cache.get("absent"), None);
    }
}
