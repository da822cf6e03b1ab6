//! Postgres order store on `sqlx`.

use super::OrderStore;
use crate::core::error::OrdersResult;
use crate::core::types::{NewOrder, Order, OrderId, OrderListQuery};
use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS orders (
    id BIGSERIAL PRIMARY KEY,
    customer_name VARCHAR(100) NOT NULL,
    total_amount NUMERIC NOT NULL CHECK (total_amount > 0),
    created_at TIMESTAMPTZ NOT NULL
)
"#;

const CREATE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS ix_orders_created_at ON orders (created_at DESC, id DESC)";

const ORDER_COLUMNS: &str = "id, customer_name, total_amount, created_at";

/// Order store backed by a Postgres connection pool
#[derive(Debug, Clone)]
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    /// Connect a pool to `url`
    pub async fn connect(url: &str, max_connections: u32) -> OrdersResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;

        info!(max_connections, "Connected to Postgres order store");
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the `orders` table and its listing index when missing
    pub async fn ensure_schema(&self) -> OrdersResult<()> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        sqlx::query(CREATE_INDEX).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn create(&self, order: NewOrder) -> OrdersResult<Order> {
        let sql = format!(
            "INSERT INTO orders (customer_name, total_amount, created_at) VALUES ($1, $2, $3) RETURNING {}",
            ORDER_COLUMNS
        );

        let created = sqlx::query_as::<_, Order>(&sql)
            .bind(&order.customer_name)
            .bind(order.total_amount)
            .bind(order.created_at)
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }

    async fn get_by_id(&self, id: OrderId) -> OrdersResult<Option<Order>> {
        let sql = format!("SELECT {} FROM orders WHERE id = $1", ORDER_COLUMNS);

        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(order)
    }

    async fn list_paged(&self, query: &OrderListQuery) -> OrdersResult<Vec<Order>> {
        let sql = format!(
            "SELECT {} FROM orders \
             WHERE ($1::TEXT IS NULL OR strpos(customer_name, $1) > 0) \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2 OFFSET $3",
            ORDER_COLUMNS
        );

        let orders = sqlx::query_as::<_, Order>(&sql)
            .bind(query.customer_name())
            .bind(query.page_size() as i64)
            .bind(query.offset() as i64)
            .fetch_all(&self.pool)
            .await?;

        Ok(orders)
    }

    async fn update(&self, order: Order) -> OrdersResult<Option<Order>> {
        let sql = format!(
            "UPDATE orders SET customer_name = $2, total_amount = $3 WHERE id = $1 RETURNING {}",
            ORDER_COLUMNS
        );

        let updated = sqlx::query_as::<_, Order>(&sql)
            .bind(order.id)
            .bind(&order.customer_name)
            .bind(order.total_amount)
            .fetch_optional(&self.pool)
            .await?;

        Ok(updated)
    }

    async fn count(&self) -> OrdersResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.max(0) as u64)
    }

    async fn average_amount(&self) -> OrdersResult<Decimal> {
        let average: Option<Decimal> = sqlx::query_scalar("SELECT AVG(total_amount) FROM orders")
            .fetch_one(&self.pool)
            .await?;

        Ok(average.unwrap_or(Decimal::ZERO))
    }

    async fn health_check(&self) -> OrdersResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
