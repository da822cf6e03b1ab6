//! # Cached Order Service
//!
//! Read-through, write-invalidate decorator over any [`OrderService`].
//!
//! Reads consult the cache first and populate it on a miss. Single-order entries are
//! removed as soon as that order is updated, so a read after an update is never stale.
//! Each update also bumps a striped per-order version; a read only populates the cache
//! if no update of its order finished while it was fetching.
//! List entries are invalidated through the configured [`ListInvalidator`]; under the
//! default sweep strategy filtered lists and off-grid pages may stay stale until they
//! expire. Metrics always bypass the cache.
//!
//! The cache is never a reason for a request to fail: cache errors are logged,
//! counted and bypassed.

use super::service::OrderService;
use crate::caching::{
    CacheStore, ExpirationPolicy, InMemoryCache, InMemoryCacheConfig, ListInvalidator, OrderCacheKeys,
    SingleFlight,
};
use crate::core::config::CacheConfig;
use crate::core::error::{OrdersError, OrdersResult};
use crate::core::types::{
    CreateOrderRequest, OrderId, OrderListQuery, OrderMetrics, OrderResponse, UpdateOrderRequest,
};
use crate::observability::metrics::{CACHE_ERRORS_TOTAL, CACHE_REQUESTS_TOTAL};
use async_trait::async_trait;
use metrics::counter;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

const VERSION_STRIPES: usize = 64;

/// Update versions for single-order entries, striped by order id
///
/// An update of any order in a stripe bumps that stripe, which at worst makes a
/// concurrent read of a neighbouring order skip populating the cache.
struct OrderVersions {
    stripes: Vec<Mutex<u64>>,
}

impl OrderVersions {
    fn new() -> Self {
        Self {
            stripes: (0..VERSION_STRIPES).map(|_| Mutex::new(0)).collect(),
        }
    }

    fn stripe(&self, id: OrderId) -> &Mutex<u64> {
        &self.stripes[id.rem_euclid(VERSION_STRIPES as i64) as usize]
    }
}

/// Values held by the order cache
#[derive(Debug, Clone, PartialEq)]
pub enum CachedValue {
    Order(OrderResponse),
    Page(Arc<Vec<OrderResponse>>),
}

/// Caching decorator
pub struct CachedOrderService {
    inner: Arc<dyn OrderService>,
    cache: Arc<dyn CacheStore<CachedValue>>,
    keys: OrderCacheKeys,
    invalidator: ListInvalidator,
    policy: ExpirationPolicy,
    versions: OrderVersions,
    order_flight: SingleFlight<Option<OrderResponse>>,
    list_flight: SingleFlight<Arc<Vec<OrderResponse>>>,
}

impl CachedOrderService {
    /// Wrap `inner` with an existing cache store
    pub fn new(inner: Arc<dyn OrderService>, cache: Arc<dyn CacheStore<CachedValue>>, config: &CacheConfig) -> Self {
        let keys = OrderCacheKeys::new(config.key_prefix.clone()).with_max_length(config.max_key_length);

        Self {
            inner,
            cache,
            invalidator: ListInvalidator::new(config.list_invalidation.clone(), keys.clone()),
            keys,
            policy: ExpirationPolicy::new(config.absolute_ttl).with_sliding(config.sliding_ttl),
            versions: OrderVersions::new(),
            order_flight: SingleFlight::new(config.single_flight),
            list_flight: SingleFlight::new(config.single_flight),
        }
    }

    /// Wrap `inner` with a fresh in-memory cache sized from `config`
    pub fn in_memory(inner: Arc<dyn OrderService>, config: &CacheConfig) -> OrdersResult<Self> {
        let cache = InMemoryCache::new(InMemoryCacheConfig {
            max_entries: config.max_entries,
            cleanup_interval: config.cleanup_interval,
        })?;

        Ok(Self::new(inner, Arc::new(cache), config))
    }

    pub fn cache(&self) -> &Arc<dyn CacheStore<CachedValue>> {
        &self.cache
    }

    pub fn keys(&self) -> &OrderCacheKeys {
        &self.keys
    }

    pub fn invalidator(&self) -> &ListInvalidator {
        &self.invalidator
    }

    async fn cache_get(&self, key: &str, namespace: &'static str) -> Option<CachedValue> {
        match self.cache.get(key).await {
            Ok(Some(value)) => {
                counter!(CACHE_REQUESTS_TOTAL, "namespace" => namespace, "outcome" => "hit").increment(1);
                debug!(key, "Cache hit");
                Some(value)
            }
            Ok(None) => {
                counter!(CACHE_REQUESTS_TOTAL, "namespace" => namespace, "outcome" => "miss").increment(1);
                debug!(key, "Cache miss");
                None
            }
            Err(e) => {
                counter!(CACHE_ERRORS_TOTAL, "operation" => "get").increment(1);
                warn!(key, error = %e, "Cache read failed, falling back to the order service");
                None
            }
        }
    }

    async fn cache_set(&self, key: &str, value: CachedValue) {
        if let Err(e) = self.cache.set(key, value, self.policy).await {
            counter!(CACHE_ERRORS_TOTAL, "operation" => "set").increment(1);
            warn!(key, error = %e, "Cache write failed");
        }
    }

    async fn invalidate_lists(&self) {
        if let Err(e) = self.invalidator.invalidate_lists(self.cache.as_ref()).await {
            counter!(CACHE_ERRORS_TOTAL, "operation" => "invalidate").increment(1);
            warn!(error = %e, "List cache invalidation failed");
        }
    }
}

#[async_trait]
impl OrderService for CachedOrderService {
    async fn create_order(&self, request: CreateOrderRequest) -> OrdersResult<OrderResponse> {
        let created = self.inner.create_order(request).await?;
        self.invalidate_lists().await;
        Ok(created)
    }

    async fn get_order_by_id(&self, id: OrderId) -> OrdersResult<Option<OrderResponse>> {
        let key = self.keys.order_key(id);

        if let Some(CachedValue::Order(order)) = self.cache_get(&key, "order").await {
            return Ok(Some(order));
        }

        let stripe = self.versions.stripe(id);
        let version = *stripe.lock().await;
        // Readers arriving after an update never join a fetch that started before it
        let flight_key = format!("{}@v{}", key, version);

        let this = self;
        let cache_key = key.as_str();
        self.order_flight
            .run(&flight_key, move || async move {
                let order = this.inner.get_order_by_id(id).await?;
                // Absent orders are not cached
                if let Some(order) = &order {
                    let current = stripe.lock().await;
                    if *current == version {
                        this.cache_set(cache_key, CachedValue::Order(order.clone())).await;
                    } else {
                        debug!(key = cache_key, "Order updated during fetch, not caching");
                    }
                }
                Ok::<_, OrdersError>(order)
            })
            .await
    }

    async fn list_orders(&self, query: &OrderListQuery) -> OrdersResult<Vec<OrderResponse>> {
        let key = self.invalidator.list_key(query);

        if let Some(CachedValue::Page(page)) = self.cache_get(&key, "list").await {
            return Ok(page.as_ref().clone());
        }

        let this = self;
        let cache_key = key.as_str();
        let page = self
            .list_flight
            .run(&key, move || async move {
                let page = Arc::new(this.inner.list_orders(query).await?);
                this.cache_set(cache_key, CachedValue::Page(page.clone())).await;
                Ok::<_, OrdersError>(page)
            })
            .await?;

        Ok(page.as_ref().clone())
    }

    async fn update_order(
        &self,
        id: OrderId,
        request: UpdateOrderRequest,
    ) -> OrdersResult<Option<OrderResponse>> {
        let updated = self.inner.update_order(id, request).await?;

        if updated.is_some() {
            let key = self.keys.order_key(id);
            {
                // Held across the eviction so no in-flight read can repopulate in between
                let mut version = self.versions.stripe(id).lock().await;
                *version = version.wrapping_add(1);
                if let Err(e) = self.cache.delete(&key).await {
                    counter!(CACHE_ERRORS_TOTAL, "operation" => "delete").increment(1);
                    warn!(key, error = %e, "Failed to evict updated order from cache");
                }
            }
            self.invalidate_lists().await;
        }

        Ok(updated)
    }

    async fn get_metrics(&self) -> OrdersResult<OrderMetrics> {
        self.inner.get_metrics().await
    }

    async fn health_check(&self) -> OrdersResult<()> {
        self.inner.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::service::DefaultOrderService;
    use crate::orders::store::InMemoryOrderStore;
    use rust_decimal::Decimal;

    fn cached_service() -> CachedOrderService {
        let inner = Arc::new(DefaultOrderService::new(Arc::new(InMemoryOrderStore::new())));
        CachedOrderService::in_memory(inner, &CacheConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_get_populates_order_entry() {
        let service = cached_service();
        let created = service
            .create_order(CreateOrderRequest::new("Ana", Decimal::new(100, 0)))
            .await
            .unwrap();

        let key = service.keys().order_key(created.id);
        assert!(!service.cache().exists(&key).await.unwrap());

        service.get_order_by_id(created.id).await.unwrap();
        assert!(service.cache().exists(&key).await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_order_is_not_cached() {
        let service = cached_service();
        assert_eq!(service.get_order_by_id(9).await.unwrap(), None);

        let key = service.keys().order_key(9);
        assert!(!service.cache().exists(&key).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_evicts_order_entry() {
        let service = cached_service();
        let created = service
            .create_order(CreateOrderRequest::new("Ana", Decimal::new(100, 0)))
            .await
            .unwrap();
        service.get_order_by_id(created.id).await.unwrap();

        service
            .update_order(created.id, UpdateOrderRequest::new(Decimal::new(250, 0)))
            .await
            .unwrap();

        let key = service.keys().order_key(created.id);
        assert!(!service.cache().exists(&key).await.unwrap());
    }

    #[tokio::test]
    async fn test_validation_errors_pass_through() {
        let service = cached_service();
        let err = service
            .create_order(CreateOrderRequest::new("", Decimal::new(5, 0)))
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), "validation_error");
    }
}
