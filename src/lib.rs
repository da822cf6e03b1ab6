//! # Orders API
//!
//! Order-management HTTP service: create, read, update and list orders, and report
//! aggregate metrics. Reads go through a read-through, write-invalidate cache that
//! decorates the store-backed order service.
//!
//! ## Layout
//! - [`core`]: data contracts, validation, errors and configuration
//! - [`caching`]: expiring cache store, key generation, list invalidation, single-flight
//! - [`orders`]: order stores, the direct service and the caching decorator
//! - [`api`]: axum handlers, middleware and the server
//! - [`observability`]: logging setup and Prometheus metrics

pub mod core;

pub mod caching;

pub mod orders;

pub mod api;

pub mod observability;

pub use crate::core::config::OrdersConfig;
pub use crate::core::error::{OrdersError, OrdersResult};
pub use crate::core::types::{
    CreateOrderRequest, Order, OrderId, OrderListQuery, OrderMetrics, OrderResponse, UpdateOrderRequest,
};
pub use api::{AppState, OrdersServer};
pub use orders::{CachedOrderService, DefaultOrderService, OrderService, OrderStore};
