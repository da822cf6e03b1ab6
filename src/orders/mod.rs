//! # Orders
//!
//! The order domain: storage backends, the direct service, and the caching
//! decorator the HTTP layer talks to.

pub mod cached;
pub mod latency;
pub mod service;
pub mod store;

pub use cached::{CachedOrderService, CachedValue};
pub use latency::LatencyTracker;
pub use service::{DefaultOrderService, OrderService};
pub use store::{InMemoryOrderStore, OrderStore, PgOrderStore};

use crate::core::config::{OrdersConfig, StoreConfig};
use crate::core::error::OrdersResult;
use std::sync::Arc;
use tracing::info;

/// Open the configured order store, creating the schema when it is relational
pub async fn build_order_store(config: &StoreConfig) -> OrdersResult<Arc<dyn OrderStore>> {
    match config {
        StoreConfig::InMemory => {
            info!("Using in-memory order store");
            Ok(Arc::new(InMemoryOrderStore::new()))
        }
        StoreConfig::Postgres { url, max_connections } => {
            let store = PgOrderStore::connect(url, *max_connections).await?;
            store.ensure_schema().await?;
            Ok(Arc::new(store))
        }
    }
}

/// Compose the service stack: the direct service, wrapped by the cache when enabled
pub fn build_order_service(
    config: &OrdersConfig,
    store: Arc<dyn OrderStore>,
) -> OrdersResult<Arc<dyn OrderService>> {
    let direct = Arc::new(DefaultOrderService::with_latency_window(
        store,
        config.latency.window_size,
    ));

    if !config.cache.enabled {
        info!("Order cache disabled");
        return Ok(direct);
    }

    info!(
        absolute_ttl = ?config.cache.absolute_ttl,
        sliding_ttl = ?config.cache.sliding_ttl,
        single_flight = config.cache.single_flight,
        "Order cache enabled"
    );
    Ok(Arc::new(CachedOrderService::in_memory(direct, &config.cache)?))
}
