//! Process-local order store, used for local runs and tests.

use super::OrderStore;
use crate::core::error::OrdersResult;
use crate::core::types::{NewOrder, Order, OrderId, OrderListQuery};
use async_trait::async_trait;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

#[derive(Debug, Default)]
struct Inner {
    next_id: OrderId,
    orders: BTreeMap<OrderId, Order>,
}

/// In-memory order store with sequential ids starting at 1
#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    inner: RwLock<Inner>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn create(&self, order: NewOrder) -> OrdersResult<Order> {
        let mut inner = self.inner.write();
        inner.next_id += 1;

        let order = Order {
            id: inner.next_id,
            customer_name: order.customer_name,
            total_amount: order.total_amount,
            created_at: order.created_at,
        };
        inner.orders.insert(order.id, order.clone());

        Ok(order)
    }

    async fn get_by_id(&self, id: OrderId) -> OrdersResult<Option<Order>> {
        Ok(self.inner.read().orders.get(&id).cloned())
    }

    async fn list_paged(&self, query: &OrderListQuery) -> OrdersResult<Vec<Order>> {
        let inner = self.inner.read();

        let mut matching: Vec<&Order> = inner
            .orders
            .values()
            .filter(|order| match query.customer_name() {
                Some(filter) => order.customer_name.contains(filter),
                None => true,
            })
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(matching
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.page_size() as usize)
            .cloned()
            .collect())
    }

    async fn update(&self, order: Order) -> OrdersResult<Option<Order>> {
        let mut inner = self.inner.write();
        match inner.orders.get_mut(&order.id) {
            Some(stored) => {
                *stored = order.clone();
                Ok(Some(order))
            }
            None => Ok(None),
        }
    }

    async fn count(&self) -> OrdersResult<u64> {
        Ok(self.inner.read().orders.len() as u64)
    }

    async fn average_amount(&self) -> OrdersResult<Decimal> {
        let inner = self.inner.read();
        if inner.orders.is_empty() {
            return Ok(Decimal::ZERO);
        }

        let total: Decimal = inner.orders.values().map(|order| order.total_amount).sum();
        Ok(total / Decimal::from(inner.orders.len() as u64))
    }

    async fn health_check(&self) -> OrdersResult<()> {
        Ok(())
    }
}
