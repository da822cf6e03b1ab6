//! # Caching System Module
//!
//! In-process caching building blocks used by the cached order service.
//!
//! ## Architecture
//! 1. **Cache Stores**: expiring key-value storage (absolute + sliding expiration)
//! 2. **Key Generators**: cache keys for list queries and single orders
//! 3. **Invalidation**: how list entries are dropped after writes
//! 4. **Deduplication**: single-flight sharing of concurrent misses
//!
//! ## Usage Example
//! ```rust,ignore
//! use orders_api::caching::{CacheStore, ExpirationPolicy, InMemoryCache, InMemoryCacheConfig};
//! use std::time::Duration;
//!
//! let cache: InMemoryCache<String> = InMemoryCache::new(InMemoryCacheConfig::default())?;
//! let policy = ExpirationPolicy::new(Duration::from_secs(300))
//!     .with_sliding(Duration::from_secs(120));
//!
//! cache.set("orders:order:1", "cached".to_string(), policy).await?;
//! assert!(cache.get("orders:order:1").await?.is_some());
//! ```

pub mod stores;
pub mod key_generator;
pub mod invalidation;
pub mod deduplication;

pub use stores::{CacheEntry, CacheStore, CacheStoreStats, ExpirationPolicy, InMemoryCache, InMemoryCacheConfig};
pub use key_generator::OrderCacheKeys;
pub use invalidation::ListInvalidator;
pub use deduplication::SingleFlight;

use crate::core::error::OrdersError;

/// Cache operation result
pub type CacheResult<T> = Result<T, CacheError>;

/// Cache-specific error types
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache store error: {message}")]
    Store { message: String },

    #[error("Cache configuration error: {message}")]
    Configuration { message: String },

    #[error("Cache not available")]
    Unavailable,
}

impl From<CacheError> for OrdersError {
    fn from(err: CacheError) -> Self {
        OrdersError::internal(format!("Cache error: {}", err))
    }
}
