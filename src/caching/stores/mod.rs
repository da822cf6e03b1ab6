//! # Cache Stores Module
//!
//! Cache entry metadata, the expiration policy and the store trait.

pub mod memory;

pub use memory::{InMemoryCache, InMemoryCacheConfig};

use super::CacheResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;

/// Per-entry expiration policy
///
/// An entry expires once `absolute_ttl` has elapsed since it was written, or once
/// `sliding_ttl` (when set) has elapsed since it was last read, whichever comes first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpirationPolicy {
    pub absolute_ttl: Duration,
    pub sliding_ttl: Option<Duration>,
}

impl ExpirationPolicy {
    /// Absolute expiration only
    pub fn new(absolute_ttl: Duration) -> Self {
        Self {
            absolute_ttl,
            sliding_ttl: None,
        }
    }

    /// Add a sliding window on top of the absolute cap
    pub fn with_sliding(mut self, sliding_ttl: Duration) -> Self {
        self.sliding_ttl = Some(sliding_ttl);
        self
    }
}

/// Cache entry with metadata
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The cached value
    pub value: V,

    /// When the entry was written
    pub created_at: Instant,

    /// Hard expiration deadline
    pub expires_at: Instant,

    /// Idle window, reset on every read
    pub sliding_ttl: Option<Duration>,

    /// Last read (or write) time
    pub last_accessed: Instant,

    /// Number of times this entry has been read
    pub access_count: u64,
}

impl<V> CacheEntry<V> {
    /// Create a new cache entry
    pub fn new(value: V, policy: ExpirationPolicy) -> Self {
        let now = Instant::now();

        Self {
            value,
            created_at: now,
            expires_at: now + policy.absolute_ttl,
            sliding_ttl: policy.sliding_ttl,
            last_accessed: now,
            access_count: 0,
        }
    }

    /// Check if the entry is expired
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    fn is_expired_at(&self, now: Instant) -> bool {
        if now >= self.expires_at {
            return true;
        }

        match self.sliding_ttl {
            Some(window) => now >= self.last_accessed + window,
            None => false,
        }
    }

    /// Mark the entry as accessed, restarting the sliding window
    pub fn mark_accessed(&mut self) {
        self.access_count += 1;
        self.last_accessed = Instant::now();
    }

    /// Age of the entry
    pub fn age(&self) -> Duration {
        Instant::now().saturating_duration_since(self.created_at)
    }

    /// Time left before the entry expires, whichever limit comes first
    pub fn ttl(&self) -> Duration {
        let deadline = match self.sliding_ttl {
            Some(window) => self.expires_at.min(self.last_accessed + window),
            None => self.expires_at,
        };
        deadline.saturating_duration_since(Instant::now())
    }
}

/// Trait for cache store implementations
#[async_trait]
pub trait CacheStore<V>: Send + Sync
where
    V: Clone + Send + Sync + 'static,
{
    /// Get a value from the cache; a hit restarts the sliding window
    async fn get(&self, key: &str) -> CacheResult<Option<V>>;

    /// Set a value in the cache with the given expiration policy
    async fn set(&self, key: &str, value: V, policy: ExpirationPolicy) -> CacheResult<()>;

    /// Delete a value from the cache
    async fn delete(&self, key: &str) -> CacheResult<bool>;

    /// Check if a live key exists, without counting as an access
    async fn exists(&self, key: &str) -> CacheResult<bool>;

    /// Clear all entries from the cache
    async fn clear(&self) -> CacheResult<()>;

    /// Get cache statistics
    async fn stats(&self) -> CacheResult<CacheStoreStats>;
}

/// Cache store statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStoreStats {
    /// Number of entries
    pub entries: usize,

    /// Number of hits
    pub hits: u64,

    /// Number of misses
    pub misses: u64,

    /// Number of capacity evictions
    pub evictions: u64,

    /// Number of expired entries cleaned up
    pub expired_cleanups: u64,
}
