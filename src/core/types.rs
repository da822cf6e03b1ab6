//! # Core Types Module
//!
//! Data contracts shared by the store, the service layer and the HTTP surface.
//!
//! `Order` is the durable entity owned by the order store. Everything handed back to
//! callers is an `OrderResponse`, a read-only projection built fresh on every call.
//! Request payloads and the list query live here too so the cache layer can derive
//! its keys from the exact same values the store sees.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Store-assigned order identity
pub type OrderId = i64;

/// Default page size when the caller gives none (or an invalid one)
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Upper bound for a single page
pub const MAX_PAGE_SIZE: u32 = 100;

/// Durable order entity
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Order {
    /// Unique, immutable once created
    pub id: OrderId,

    /// Customer name (non-empty, at most 100 characters)
    pub customer_name: String,

    /// Total amount, always in (0, 1_000_000)
    pub total_amount: Decimal,

    /// Creation timestamp (UTC), immutable
    pub created_at: DateTime<Utc>,
}

/// Order about to be persisted; the store assigns the id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub customer_name: String,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Read-only projection of an [`Order`] returned to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: OrderId,
    pub customer_name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            customer_name: order.customer_name,
            total_amount: order.total_amount,
            created_at: order.created_at,
        }
    }
}

/// Payload for creating an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub customer_name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
}

impl CreateOrderRequest {
    pub fn new(customer_name: impl Into<String>, total_amount: Decimal) -> Self {
        Self {
            customer_name: customer_name.into(),
            total_amount,
        }
    }
}

/// Payload for updating the amount of an existing order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderRequest {
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
}

impl UpdateOrderRequest {
    pub fn new(total_amount: Decimal) -> Self {
        Self { total_amount }
    }
}

/// Paginated, optionally name-filtered order listing
///
/// Built through [`OrderListQuery::new`], which coerces the page to at least 1,
/// falls back to [`DEFAULT_PAGE_SIZE`] for a page size below 1, caps it at
/// [`MAX_PAGE_SIZE`] and drops blank name filters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrderListQuery {
    page: u32,
    page_size: u32,
    customer_name: Option<String>,
}

impl OrderListQuery {
    pub fn new(page: i64, page_size: i64, customer_name: Option<String>) -> Self {
        let page = page.clamp(1, u32::MAX as i64) as u32;
        let page_size = if page_size < 1 {
            DEFAULT_PAGE_SIZE
        } else {
            page_size.min(MAX_PAGE_SIZE as i64) as u32
        };
        let customer_name = customer_name.filter(|name| !name.trim().is_empty());

        Self {
            page,
            page_size,
            customer_name,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn customer_name(&self) -> Option<&str> {
        self.customer_name.as_deref()
    }

    /// Number of rows to skip: `(page - 1) * page_size`
    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.page_size as u64
    }
}

impl Default for OrderListQuery {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE as i64, None)
    }
}

/// Aggregate order metrics, computed on demand and never persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderMetrics {
    pub total_orders: u64,
    #[serde(with = "rust_decimal::serde::float")]
    pub average_order_amount: Decimal,
    pub average_creation_time_ms: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_normalization() {
        let query = OrderListQuery::new(0, 0, Some("   ".to_string()));
        assert_eq!(query.page(), 1);
        assert_eq!(query.page_size(), DEFAULT_PAGE_SIZE);
        assert_eq!(query.customer_name(), None);

        let query = OrderListQuery::new(-4, 500, Some("Ana".to_string()));
        assert_eq!(query.page(), 1);
        assert_eq!(query.page_size(), MAX_PAGE_SIZE);
        assert_eq!(query.customer_name(), Some("Ana"));
    }

    #[test]
    fn test_list_query_offset() {
        assert_eq!(OrderListQuery::new(1, 10, None).offset(), 0);
        assert_eq!(OrderListQuery::new(3, 25, None).offset(), 50);
    }

    #[test]
    fn test_order_response_json_shape() {
        let response = OrderResponse {
            id: 1,
            customer_name: "Ana".to_string(),
            total_amount: Decimal::new(10050, 2),
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["customerName"], "Ana");
        assert_eq!(json["totalAmount"], 100.5);
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn test_create_request_accepts_numeric_amount() {
        let request: CreateOrderRequest =
            serde_json::from_str(r#"{"customerName":"Ana","totalAmount":350.5}"#).unwrap();
        assert_eq!(request.customer_name, "Ana");
        assert_eq!(request.total_amount, Decimal::new(3505, 1));
    }
}
