//! # In-Memory Cache Store
//!
//! `DashMap`-backed cache with absolute and sliding expiration, least-recently-used
//! eviction at capacity and a background sweep of expired entries.

use super::{CacheEntry, CacheStore, CacheStoreStats, ExpirationPolicy};
use crate::caching::{CacheError, CacheResult};
use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, info};

/// In-memory cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InMemoryCacheConfig {
    /// Maximum number of entries
    pub max_entries: usize,

    /// Cleanup interval for expired entries
    pub cleanup_interval: Duration,
}

impl Default for InMemoryCacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 10000,
            cleanup_interval: Duration::from_secs(60),
        }
    }
}

/// In-memory cache implementation
pub struct InMemoryCache<V> {
    /// Configuration
    config: InMemoryCacheConfig,

    /// Cache entries storage
    entries: Arc<DashMap<String, CacheEntry<V>>>,

    /// Atomic counters for statistics
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    expired_cleanups: Arc<AtomicU64>,

    /// Cleanup task handle, aborted on drop
    cleanup_task: JoinHandle<()>,
}

impl<V> InMemoryCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Create a new in-memory cache. Must be called inside a Tokio runtime.
    pub fn new(config: InMemoryCacheConfig) -> CacheResult<Self> {
        if config.max_entries == 0 {
            return Err(CacheError::Configuration {
                message: "max_entries must be greater than 0".to_string(),
            });
        }
        if config.cleanup_interval.is_zero() {
            return Err(CacheError::Configuration {
                message: "cleanup_interval must be greater than 0".to_string(),
            });
        }

        let entries = Arc::new(DashMap::new());
        let expired_cleanups = Arc::new(AtomicU64::new(0));

        let cleanup_task = {
            let entries = entries.clone();
            let expired_cleanups = expired_cleanups.clone();
            let cleanup_interval = config.cleanup_interval;

            tokio::spawn(async move {
                let mut interval = interval(cleanup_interval);
                loop {
                    interval.tick().await;
                    Self::cleanup_expired_entries(&entries, &expired_cleanups);
                }
            })
        };

        Ok(Self {
            config,
            entries,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
            expired_cleanups,
            cleanup_task,
        })
    }

    /// Cleanup expired entries
    fn cleanup_expired_entries(entries: &DashMap<String, CacheEntry<V>>, expired_cleanups: &AtomicU64) {
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired());
        let cleaned_count = before.saturating_sub(entries.len());

        if cleaned_count > 0 {
            expired_cleanups.fetch_add(cleaned_count as u64, Ordering::Relaxed);
            debug!("Cleaned up {} expired cache entries", cleaned_count);
        }
    }

    /// Make room for one more entry
    fn evict_if_needed(&self, incoming_key: &str) {
        if self.entries.len() < self.config.max_entries || self.entries.contains_key(incoming_key) {
            return;
        }

        // Expired entries go first; they are free to drop
        Self::cleanup_expired_entries(&self.entries, &self.expired_cleanups);
        if self.entries.len() < self.config.max_entries {
            return;
        }

        // Keep 90% of max entries
        let evict_count = std::cmp::max(
            self.entries.len().saturating_sub(self.config.max_entries * 9 / 10),
            1,
        );

        let mut by_access: Vec<(String, tokio::time::Instant)> = self
            .entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().last_accessed))
            .collect();
        by_access.sort_by_key(|(_, last_accessed)| *last_accessed);

        let mut evicted_count = 0u64;
        for (key, _) in by_access.into_iter().take(evict_count) {
            if self.entries.remove(&key).is_some() {
                evicted_count += 1;
            }
        }

        self.evictions.fetch_add(evicted_count, Ordering::Relaxed);
        info!("Evicted {} least recently used cache entries", evicted_count);
    }
}

impl<V> Drop for InMemoryCache<V> {
    fn drop(&mut self) {
        self.cleanup_task.abort();
    }
}

#[async_trait]
impl<V> CacheStore<V> for InMemoryCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &str) -> CacheResult<Option<V>> {
        if let Some(mut entry) = self.entries.get_mut(key) {
            if entry.is_expired() {
                drop(entry);
                if self.entries.remove_if(key, |_, e| e.is_expired()).is_some() {
                    self.expired_cleanups.fetch_add(1, Ordering::Relaxed);
                }
                self.misses.fetch_add(1, Ordering::Relaxed);
                return Ok(None);
            }

            entry.mark_accessed();
            let value = entry.value.clone();

            self.hits.fetch_add(1, Ordering::Relaxed);
            Ok(Some(value))
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            Ok(None)
        }
    }

    async fn set(&self, key: &str, value: V, policy: ExpirationPolicy) -> CacheResult<()> {
        self.evict_if_needed(key);
        self.entries.insert(key.to_string(), CacheEntry::new(value, policy));
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<bool> {
        Ok(self.entries.remove(key).is_some())
    }

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        Ok(self
            .entries
            .get(key)
            .map(|entry| !entry.is_expired())
            .unwrap_or(false))
    }

    async fn clear(&self) -> CacheResult<()> {
        let entry_count = self.entries.len();
        self.entries.clear();

        info!("Cleared {} entries from in-memory cache", entry_count);
        Ok(())
    }

    async fn stats(&self) -> CacheResult<CacheStoreStats> {
        Ok(CacheStoreStats {
            entries: self.entries.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            expired_cleanups: self.expired_cleanups.load(Ordering::Relaxed),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    fn policy() -> ExpirationPolicy {
        ExpirationPolicy::new(Duration::from_secs(300)).with_sliding(Duration::from_secs(120))
    }

    #[tokio::test]
    async fn test_basic_operations() {
        let cache = InMemoryCache::new(InMemoryCacheConfig::default()).unwrap();

        cache.set("test_key", "test_value".to_string(), policy()).await.unwrap();
        let result = cache.get("test_key").await.unwrap();
        assert_eq!(result, Some("test_value".to_string()));

        assert!(cache.exists("test_key").await.unwrap());

        assert!(cache.delete("test_key").await.unwrap());
        assert!(!cache.exists("test_key").await.unwrap());
        assert!(!cache.delete("test_key").await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sliding_expiration_without_access() {
        let cache = InMemoryCache::new(InMemoryCacheConfig::default()).unwrap();
        cache.set("idle", 1u32, policy()).await.unwrap();

        advance(Duration::from_secs(121)).await;

        assert_eq!(cache.get("idle").await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_absolute_expiration_caps_sliding_renewals() {
        let cache = InMemoryCache::new(InMemoryCacheConfig::default()).unwrap();
        cache.set("busy", 1u32, policy()).await.unwrap();

        // Read every 90s: the sliding window never lapses
        for _ in 0..3 {
            advance(Duration::from_secs(90)).await;
            assert_eq!(cache.get("busy").await.unwrap(), Some(1));
        }

        // 360s since the write: past the 5 minute cap
        advance(Duration::from_secs(90)).await;
        assert_eq!(cache.get("busy").await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_background_cleanup() {
        let config = InMemoryCacheConfig {
            cleanup_interval: Duration::from_secs(10),
            ..Default::default()
        };
        let cache = InMemoryCache::new(config).unwrap();
        cache.set("short", 1u32, ExpirationPolicy::new(Duration::from_secs(5))).await.unwrap();

        // Let the interval fire after expiry
        tokio::time::sleep(Duration::from_secs(11)).await;

        let stats = cache.stats().await.unwrap();
        assert_eq!(stats.entries, 0);
        assert_eq!(stats.expired_cleanups, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_eviction() {
        let config = InMemoryCacheConfig {
            max_entries: 3,
            ..Default::default()
        };
        let cache = InMemoryCache::new(config).unwrap();

        for i in 0..3 {
            cache.set(&format!("key_{}", i), i, policy()).await.unwrap();
            advance(Duration::from_millis(10)).await;
        }

        // Access first key to make it recently used
        cache.get("key_0").await.unwrap();

        cache.set("key_3", 3, policy()).await.unwrap();

        // key_1 should be evicted (least recently used)
        assert!(!cache.exists("key_1").await.unwrap());
        assert!(cache.exists("key_0").await.unwrap());
        assert!(cache.exists("key_2").await.unwrap());
        assert!(cache.exists("key_3").await.unwrap());
        assert_eq!(cache.stats().await.unwrap().evictions, 1);
    }

    #[tokio::test]
    async fn test_stats() {
        let cache = InMemoryCache::new(InMemoryCacheConfig::default()).unwrap();

        cache.set("key1", 1u32, policy()).await.unwrap();
        cache.get("key1").await.unwrap(); // Hit
        cache.get("key2").await.unwrap(); // Miss

        let stats = cache.stats().await.unwrap();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
    }

    #[tokio::test]
    async fn test_rejects_zero_capacity() {
        let config = InMemoryCacheConfig {
            max_entries: 0,
            ..Default::default()
        };
        assert!(InMemoryCache::<u32>::new(config).is_err());
    }
}
