//! # Cache Invalidation Module
//!
//! Drops cached list pages after an order is created or updated.
//!
//! Two strategies are available:
//! - **Sweep** removes the unfiltered list keys for a fixed grid of pages and page
//!   sizes. Filtered lists and pages outside the grid are left to expire on their own.
//! - **Generation** embeds a counter in every list key. A write bumps the counter,
//!   which makes every previously cached list unreachable in one step. The orphaned
//!   entries age out through expiration or capacity eviction.

use super::{CacheResult, CacheStore, OrderCacheKeys};
use crate::core::config::ListInvalidationStrategy;
use crate::core::types::OrderListQuery;
use crate::observability::metrics::CACHE_INVALIDATIONS_TOTAL;
use metrics::counter;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// List invalidation manager
#[derive(Debug)]
pub struct ListInvalidator {
    strategy: ListInvalidationStrategy,
    keys: OrderCacheKeys,
    generation: AtomicU64,
}

impl ListInvalidator {
    pub fn new(strategy: ListInvalidationStrategy, keys: OrderCacheKeys) -> Self {
        Self {
            strategy,
            keys,
            generation: AtomicU64::new(0),
        }
    }

    pub fn strategy(&self) -> &ListInvalidationStrategy {
        &self.strategy
    }

    /// Generation to embed in list keys, `None` under the sweep strategy
    pub fn current_generation(&self) -> Option<u64> {
        match self.strategy {
            ListInvalidationStrategy::Generation => Some(self.generation.load(Ordering::Acquire)),
            ListInvalidationStrategy::Sweep { .. } => None,
        }
    }

    /// Cache key for a list page under the active strategy
    pub fn list_key(&self, query: &OrderListQuery) -> String {
        self.keys.list_key(query, self.current_generation())
    }

    /// Every unfiltered list key covered by the sweep grid
    pub fn sweep_keys(&self) -> Vec<String> {
        let ListInvalidationStrategy::Sweep {
            max_page,
            min_page_size,
            max_page_size,
            page_size_step,
        } = self.strategy
        else {
            return Vec::new();
        };

        let step = page_size_step.max(1) as usize;
        let mut keys = Vec::new();
        for page in 1..=max_page {
            for page_size in (min_page_size..=max_page_size).step_by(step) {
                let query = OrderListQuery::new(page as i64, page_size as i64, None);
                keys.push(self.keys.list_key(&query, None));
            }
        }
        keys.dedup();
        keys
    }

    /// Invalidate cached list pages. Returns the number of entries removed
    /// (always zero under the generation strategy).
    pub async fn invalidate_lists<V>(&self, cache: &dyn CacheStore<V>) -> CacheResult<usize>
    where
        V: Clone + Send + Sync + 'static,
    {
        match &self.strategy {
            ListInvalidationStrategy::Generation => {
                let previous = self.generation.fetch_add(1, Ordering::AcqRel);
                counter!(CACHE_INVALIDATIONS_TOTAL, "strategy" => "generation").increment(1);
                debug!(generation = previous + 1, "Advanced list cache generation");
                Ok(0)
            }
            ListInvalidationStrategy::Sweep { .. } => {
                let mut removed = 0;
                for key in self.sweep_keys() {
                    if cache.delete(&key).await? {
                        removed += 1;
                    }
                }
                counter!(CACHE_INVALIDATIONS_TOTAL, "strategy" => "sweep").increment(1);
                debug!(removed, "Swept unfiltered list cache entries");
                Ok(removed)
            }
        }
    }
}
