//! # Order Store
//!
//! Durable keyed storage for orders. The store owns the entities; everything above
//! it works on copies.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryOrderStore;
pub use postgres::PgOrderStore;

use crate::core::error::OrdersResult;
use crate::core::types::{NewOrder, Order, OrderId, OrderListQuery};
use async_trait::async_trait;
use rust_decimal::Decimal;

/// Storage backend for orders
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist a new order and return it with its assigned id
    async fn create(&self, order: NewOrder) -> OrdersResult<Order>;

    async fn get_by_id(&self, id: OrderId) -> OrdersResult<Option<Order>>;

    /// One page of orders, newest first (ties broken by id, descending). The name
    /// filter is a case-sensitive substring match.
    async fn list_paged(&self, query: &OrderListQuery) -> OrdersResult<Vec<Order>>;

    /// Replace the stored row for `order.id`; `None` when the id does not exist
    async fn update(&self, order: Order) -> OrdersResult<Option<Order>>;

    async fn count(&self) -> OrdersResult<u64>;

    /// Mean order amount, zero when the store is empty
    async fn average_amount(&self) -> OrdersResult<Decimal>;

    /// Cheap connectivity probe
    async fn health_check(&self) -> OrdersResult<()>;
}
