//! # Single-Flight Deduplication
//!
//! Concurrent cache misses for the same key share one store query. The first caller
//! runs the fetch; everyone arriving while it is in flight awaits the same result.
//! A failed fetch is not shared: each waiter then runs its own attempt.

use dashmap::DashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::trace;

/// Per-key in-flight fetch registry
pub struct SingleFlight<V> {
    enabled: bool,
    in_flight: DashMap<String, Arc<OnceCell<V>>>,
}

impl<V> SingleFlight<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Create a registry. When `enabled` is false every call runs its own fetch.
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            in_flight: DashMap::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Number of keys with a fetch currently in flight
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Run `fetch` for `key`, joining an in-flight fetch for the same key if any.
    pub async fn run<F, Fut, E>(&self, key: &str, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if !self.enabled {
            return fetch().await;
        }

        let cell = self
            .in_flight
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .value()
            .clone();

        if Arc::strong_count(&cell) > 2 {
            trace!(key, "Joining in-flight fetch");
        }

        let result = cell.get_or_try_init(fetch).await.cloned();

        // Only the registration we joined is removed; a newer one stays
        self.in_flight.remove_if(key, |_, current| Arc::ptr_eq(current, &cell));

        result
    }
}
