//! # Cache Key Generator
//!
//! Builds the cache keys for order lookups and list pages.
//!
//! Key shapes (with the default `orders:` prefix):
//! - single order: `orders:order:<id>`
//! - list page: `orders:list:<page>:<size>:all` or `orders:list:<page>:<size>:name=<filter>`
//! - list page under generation invalidation: `orders:list:g<gen>:<page>:<size>:...`
//!
//! The `name=` marker keeps a literal filter of `"all"` from colliding with the
//! unfiltered key. Keys longer than `max_length` are replaced by a SHA-256 digest.

use crate::core::types::{OrderId, OrderListQuery};
use sha2::{Digest, Sha256};

/// Default key prefix
pub const DEFAULT_KEY_PREFIX: &str = "orders:";

/// Default maximum key length before hashing
pub const DEFAULT_MAX_KEY_LENGTH: usize = 250;

/// Key generator for the order cache
#[derive(Debug, Clone)]
pub struct OrderCacheKeys {
    prefix: String,
    max_length: usize,
}

impl OrderCacheKeys {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            max_length: DEFAULT_MAX_KEY_LENGTH,
        }
    }

    /// Create with custom max length
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Key for a single order
    pub fn order_key(&self, id: OrderId) -> String {
        format!("{}order:{}", self.prefix, id)
    }

    /// Key for one list page. `generation` is set only under generation-based
    /// invalidation, so bumping it orphans every older list key at once.
    pub fn list_key(&self, query: &OrderListQuery, generation: Option<u64>) -> String {
        let filter = match query.customer_name() {
            Some(name) => format!("name={}", name),
            None => "all".to_string(),
        };

        let key = match generation {
            Some(generation) => format!(
                "{}list:g{}:{}:{}:{}",
                self.prefix,
                generation,
                query.page(),
                query.page_size(),
                filter
            ),
            None => format!(
                "{}list:{}:{}:{}",
                self.prefix,
                query.page(),
                query.page_size(),
                filter
            ),
        };

        self.truncate_key(key)
    }

    /// Replace over-long keys (long filters) with a fixed-size digest
    fn truncate_key(&self, key: String) -> String {
        if key.len() <= self.max_length {
            return key;
        }

        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        let hash = hasher.finalize();
        format!("{}list:digest:{:x}", self.prefix, hash)
    }
}

impl Default for OrderCacheKeys {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_PREFIX)
    }
}
