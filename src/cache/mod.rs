//! # Read Cache
//!
//! Bounded, time-expiring `token -> long URL` memo in front of the store.
//!
//! The cache holds disposable copies only. It is filled lazily on a store
//! hit and never proactively refreshed by writes, so an entry may outlive a
//! change to its mapping in another process for up to `expire_after_write`.
//! Negative results are never cached.

use std::time::Duration;

use moka::future::Cache;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Upper bound on live entries; eviction past it is approximate LFU/LRU.
    pub maximum_entries: u64,
    /// Entries are dropped no later than this long after insertion.
    pub expire_after_write: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            maximum_entries: 10_000,
            expire_after_write: Duration::from_secs(60 * 60),
        }
    }
}

/// Concurrent cache handle. Clones share the same entries.
#[derive(Debug, Clone)]
pub struct UrlCache {
    inner: Cache<String, String>,
}

impl UrlCache {
    #[must_use]
    pub fn new(config: CacheConfig) -> Self {
        let inner = Cache::builder()
            .max_capacity(config.maximum_entries)
            .time_to_live(config.expire_after_write)
            .build();
        Self { inner }
    }

    pub async fn get(&self, token: &str) -> Option<String> {
        let hit = self.inner.get(token).await;
        trace!(token, hit = hit.is_some(), "Read cache lookup");
        hit
    }

    pub async fn put(&self, token: &str, long_url: &str) {
        self.inner
            .insert(token.to_string(), long_url.to_string())
            .await;
    }

    pub async fn invalidate(&self, token: &str) {
        self.inner.invalidate(token).await;
    }

    /// Approximate number of live entries.
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }

    /// Applies pending evictions so `entry_count` is up to date.
    pub async fn sync(&self) {
        self.inner.run_pending_tasks().await;
    }
}

impl Default for UrlCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_then_get() {
        let cache = UrlCache::default();

        assert_eq!(cache.get("abc123").await, None);
        cache.put("abc123", "http://example.com").await;
        assert_eq!(cache.get("abc123").await.as_deref(), Some("http://example.com"));
    }

    #[tokio::test]
    async fn test_invalidate() {
        let cache = UrlCache::default();

        cache.put("abc123", "http://example.com").await;
        cache.invalidate("abc123").await;
        assert_eq!(cache.get("abc123").await, None);
    }

    #[tokio::test]
    async fn test_entries_expire_after_write() {
        let cache = UrlCache::new(CacheConfig {
            maximum_entries: 100,
            expire_after_write: Duration::from_millis(50),
        });

        cache.put("abc123", "http://example.com").await;
        tokio::time::sleep(Duration::from_millis(150)).await;

        assert_eq!(cache.get("abc123").await, None);
    }

    #[tokio::test]
    async fn test_capacity_is_bounded() {
        let cache = UrlCache::new(CacheConfig {
            maximum_entries: 2,
            expire_after_write: Duration::from_secs(60),
        });

        for i in 0..10 {
            cache.put(&format!("{i:06x}"), "http://example.com").await;
        }
        cache.sync().await;

        assert!(cache.entry_count() <= 2, "holds {}", cache.entry_count());
    }
}
