//! # Order Service
//!
//! Business-level CRUD and metrics on top of an [`OrderStore`]. No caching happens
//! here; [`crate::orders::CachedOrderService`] wraps this type for that.

use super::latency::LatencyTracker;
use super::store::OrderStore;
use crate::core::error::{OrdersError, OrdersResult};
use crate::core::types::{
    CreateOrderRequest, NewOrder, OrderId, OrderListQuery, OrderMetrics, OrderResponse, UpdateOrderRequest,
};
use crate::core::validation::{validate_create, validate_update};
use crate::observability::metrics::{ORDERS_CREATED_TOTAL, ORDER_CREATION_DURATION_SECONDS};
use async_trait::async_trait;
use chrono::Utc;
use metrics::{counter, histogram};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Order operations exposed to the HTTP surface.
///
/// A missing order is a normal outcome and comes back as `Ok(None)`.
#[async_trait]
pub trait OrderService: Send + Sync {
    async fn create_order(&self, request: CreateOrderRequest) -> OrdersResult<OrderResponse>;

    async fn get_order_by_id(&self, id: OrderId) -> OrdersResult<Option<OrderResponse>>;

    async fn list_orders(&self, query: &OrderListQuery) -> OrdersResult<Vec<OrderResponse>>;

    async fn update_order(
        &self,
        id: OrderId,
        request: UpdateOrderRequest,
    ) -> OrdersResult<Option<OrderResponse>>;

    /// Always computed from live state
    async fn get_metrics(&self) -> OrdersResult<OrderMetrics>;

    async fn health_check(&self) -> OrdersResult<()>;
}

/// Store-backed implementation
pub struct DefaultOrderService {
    store: Arc<dyn OrderStore>,
    latency: LatencyTracker,
}

impl DefaultOrderService {
    pub fn new(store: Arc<dyn OrderStore>) -> Self {
        Self {
            store,
            latency: LatencyTracker::default(),
        }
    }

    /// Keep the last `window_size` creation latencies for the metrics average
    pub fn with_latency_window(store: Arc<dyn OrderStore>, window_size: usize) -> Self {
        Self {
            store,
            latency: LatencyTracker::new(window_size),
        }
    }

    pub fn latency(&self) -> &LatencyTracker {
        &self.latency
    }
}

#[async_trait]
impl OrderService for DefaultOrderService {
    async fn create_order(&self, request: CreateOrderRequest) -> OrdersResult<OrderResponse> {
        let errors = validate_create(&request);
        if !errors.is_empty() {
            return Err(OrdersError::validation(errors));
        }

        let new_order = NewOrder {
            customer_name: request.customer_name,
            total_amount: request.total_amount,
            created_at: Utc::now(),
        };

        let started = Instant::now();
        let order = self.store.create(new_order).await?;
        let elapsed = started.elapsed();

        self.latency.record(elapsed);
        histogram!(ORDER_CREATION_DURATION_SECONDS).record(elapsed.as_secs_f64());
        counter!(ORDERS_CREATED_TOTAL).increment(1);

        info!(
            order_id = order.id,
            elapsed_ms = elapsed.as_secs_f64() * 1000.0,
            "Order created"
        );

        Ok(order.into())
    }

    async fn get_order_by_id(&self, id: OrderId) -> OrdersResult<Option<OrderResponse>> {
        let order = self.store.get_by_id(id).await?;
        Ok(order.map(OrderResponse::from))
    }

    async fn list_orders(&self, query: &OrderListQuery) -> OrdersResult<Vec<OrderResponse>> {
        let orders = self.store.list_paged(query).await?;
        debug!(
            page = query.page(),
            page_size = query.page_size(),
            returned = orders.len(),
            "Listed orders"
        );
        Ok(orders.into_iter().map(OrderResponse::from).collect())
    }

    async fn update_order(
        &self,
        id: OrderId,
        request: UpdateOrderRequest,
    ) -> OrdersResult<Option<OrderResponse>> {
        let errors = validate_update(&request);
        if !errors.is_empty() {
            return Err(OrdersError::validation(errors));
        }

        let Some(mut order) = self.store.get_by_id(id).await? else {
            return Ok(None);
        };

        order.total_amount = request.total_amount;
        let updated = self.store.update(order).await?;

        if updated.is_some() {
            info!(order_id = id, "Order updated");
        }

        Ok(updated.map(OrderResponse::from))
    }

    async fn get_metrics(&self) -> OrdersResult<OrderMetrics> {
        let total_orders = self.store.count().await?;
        let average_order_amount = if total_orders > 0 {
            self.store.average_amount().await?.round_dp(2)
        } else {
            rust_decimal::Decimal::ZERO
        };

        Ok(OrderMetrics {
            total_orders,
            average_order_amount,
            average_creation_time_ms: self.latency.average_ms(),
        })
    }

    async fn health_check(&self) -> OrdersResult<()> {
        self.store.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::store::InMemoryOrderStore;
    use rust_decimal::Decimal;

    fn service() -> DefaultOrderService {
        DefaultOrderService::new(Arc::new(InMemoryOrderStore::new()))
    }

    #[tokio::test]
    async fn test_create_echoes_input() {
        let service = service();
        let created = service
            .create_order(CreateOrderRequest::new("Ana", Decimal::new(10000, 2)))
            .await
            .unwrap();

        assert_eq!(created.id, 1);
        assert_eq!(created.customer_name, "Ana");
        assert_eq!(created.total_amount, Decimal::new(10000, 2));
        assert_eq!(service.latency().len(), 1);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_input() {
        let service = service();
        let err = service
            .create_order(CreateOrderRequest::new("  ", Decimal::ZERO))
            .await
            .unwrap_err();

        match err {
            OrdersError::Validation { errors } => assert_eq!(errors.len(), 2),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(service.latency().is_empty());
    }

    #[tokio::test]
    async fn test_update_keeps_name_and_timestamp() {
        let service = service();
        let created = service
            .create_order(CreateOrderRequest::new("Ana", Decimal::new(100, 0)))
            .await
            .unwrap();

        let updated = service
            .update_order(created.id, UpdateOrderRequest::new(Decimal::new(250, 0)))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.customer_name, created.customer_name);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.total_amount, Decimal::new(250, 0));
    }

    #[tokio::test]
    async fn test_update_unknown_order() {
        let updated = service()
            .update_order(42, UpdateOrderRequest::new(Decimal::ONE))
            .await
            .unwrap();
        assert_eq!(updated, None);
    }

    #[tokio::test]
    async fn test_metrics_on_empty_store() {
        let metrics = service().get_metrics().await.unwrap();
        assert_eq!(metrics.total_orders, 0);
        assert_eq!(metrics.average_order_amount, Decimal::ZERO);
        assert_eq!(metrics.average_creation_time_ms, 0.0);
    }

    #[tokio::test]
    async fn test_metrics_average_is_rounded() {
        let service = service();
        for amount in [Decimal::new(10, 0), Decimal::new(10, 0), Decimal::new(20, 0)] {
            service
                .create_order(CreateOrderRequest::new("Ana", amount))
                .await
                .unwrap();
        }

        let metrics = service.get_metrics().await.unwrap();
        assert_eq!(metrics.total_orders, 3);
        assert_eq!(metrics.average_order_amount, Decimal::new(1333, 2));
    }
}
