//! # HTTP API Integration Tests
//!
//! Contract tests for the order endpoints through the full router and middleware stack.

use async_trait::async_trait;
use axum::http::StatusCode;
use axum_test::TestServer;
use orders_api::api::build_router;
use orders_api::core::types::NewOrder;
use orders_api::orders::{build_order_service, InMemoryOrderStore, OrderStore};
use orders_api::{AppState, Order, OrderId, OrderListQuery, OrdersConfig, OrdersError, OrdersResult};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::sync::Arc;

/// Store whose backend is permanently unreachable
struct UnreachableStore;

#[async_trait]
impl OrderStore for UnreachableStore {
    async fn create(&self, _order: NewOrder) -> OrdersResult<Order> {
        Err(OrdersError::persistence("connection refused: 10.0.0.7:5432"))
    }

    async fn get_by_id(&self, _id: OrderId) -> OrdersResult<Option<Order>> {
        Err(OrdersError::persistence("connection refused: 10.0.0.7:5432"))
    }

    async fn list_paged(&self, _query: &OrderListQuery) -> OrdersResult<Vec<Order>> {
        Err(OrdersError::persistence("connection refused: 10.0.0.7:5432"))
    }

    async fn update(&self, _order: Order) -> OrdersResult<Option<Order>> {
        Err(OrdersError::persistence("connection refused: 10.0.0.7:5432"))
    }

    async fn count(&self) -> OrdersResult<u64> {
        Err(OrdersError::persistence("connection refused: 10.0.0.7:5432"))
    }

    async fn average_amount(&self) -> OrdersResult<Decimal> {
        Err(OrdersError::persistence("connection refused: 10.0.0.7:5432"))
    }

    async fn health_check(&self) -> OrdersResult<()> {
        Err(OrdersError::persistence("connection refused: 10.0.0.7:5432"))
    }
}

fn server_over(store: Arc<dyn OrderStore>) -> TestServer {
    let config = OrdersConfig::default();
    let service = build_order_service(&config, store).unwrap();
    let app = build_router(AppState::new(service), &config);
    TestServer::new(app).unwrap()
}

fn create_test_server() -> TestServer {
    server_over(Arc::new(InMemoryOrderStore::new()))
}

async fn create_order(server: &TestServer, name: &str, amount: f64) -> Value {
    let response = server
        .post("/api/orders")
        .json(&json!({ "customerName": name, "totalAmount": amount }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    response.json()
}

#[tokio::test]
async fn test_create_order_returns_created_with_location() {
    let server = create_test_server();

    let response = server
        .post("/api/orders")
        .json(&json!({ "customerName": "Ana", "totalAmount": 100.5 }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    assert_eq!(response.header("location"), "/api/orders/1");

    let body: Value = response.json();
    assert_eq!(body["id"], 1);
    assert_eq!(body["customerName"], "Ana");
    assert_eq!(body["totalAmount"], 100.5);
    assert!(body["createdAt"].is_string());
}

#[tokio::test]
async fn test_create_order_reports_every_validation_error() {
    let server = create_test_server();

    let response = server
        .post("/api/orders")
        .json(&json!({ "customerName": "   ", "totalAmount": 1000000 }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    let errors = body["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0]["field"], "customerName");
    assert_eq!(errors[1]["field"], "totalAmount");
}

#[tokio::test]
async fn test_create_order_rejects_unreadable_body() {
    let server = create_test_server();

    let response = server
        .post("/api/orders")
        .json(&json!({ "customerName": "Ana", "totalAmount": "lots" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_get_order_rejects_non_positive_ids() {
    let server = create_test_server();

    for path in ["/api/orders/0", "/api/orders/-3", "/api/orders/abc"] {
        let response = server.get(path).await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST, "{}", path);
    }
}

#[tokio::test]
async fn test_get_unknown_order_is_not_found() {
    let server = create_test_server();

    let response = server.get("/api/orders/99").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_then_get_returns_new_amount() {
    let server = create_test_server();
    let created = create_order(&server, "Ana", 100.0).await;

    // Prime the cache
    let response = server.get("/api/orders/1").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let response = server
        .put("/api/orders/1")
        .json(&json!({ "totalAmount": 250.0 }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let updated: Value = response.json();
    assert_eq!(updated["totalAmount"], 250.0);
    assert_eq!(updated["createdAt"], created["createdAt"]);

    let fetched: Value = server.get("/api/orders/1").await.json();
    assert_eq!(fetched["totalAmount"], 250.0);
    assert_eq!(fetched["customerName"], "Ana");
}

#[tokio::test]
async fn test_update_unknown_and_invalid() {
    let server = create_test_server();

    let response = server
        .put("/api/orders/5")
        .json(&json!({ "totalAmount": 10.0 }))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    create_order(&server, "Ana", 100.0).await;
    let response = server
        .put("/api/orders/1")
        .json(&json!({ "totalAmount": -1.0 }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["errors"][0]["field"], "totalAmount");
}

#[tokio::test]
async fn test_list_pagination_is_coerced() {
    let server = create_test_server();
    for i in 0..12 {
        create_order(&server, &format!("Customer {}", i), 10.0 + i as f64).await;
    }

    let page: Vec<Value> = server.get("/api/orders?page=0&pageSize=0").await.json();
    assert_eq!(page.len(), 10);
    assert_eq!(page[0]["id"], 12);

    let page: Vec<Value> = server.get("/api/orders?pageSize=500").await.json();
    assert_eq!(page.len(), 12);

    let page: Vec<Value> = server.get("/api/orders?page=3&pageSize=5").await.json();
    let ids: Vec<i64> = page.iter().map(|o| o["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![2, 1]);
}

#[tokio::test]
async fn test_list_filters_by_customer_name() {
    let server = create_test_server();
    create_order(&server, "Ana Silva", 10.0).await;
    create_order(&server, "Bob", 20.0).await;
    create_order(&server, "Mariana", 30.0).await;

    let page: Vec<Value> = server.get("/api/orders?customerName=ana").await.json();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0]["customerName"], "Mariana");
}

#[tokio::test]
async fn test_list_rejects_unparseable_query() {
    let server = create_test_server();

    let response = server.get("/api/orders?page=first").await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let server = create_test_server();

    let empty: Value = server.get("/api/metrics").await.json();
    assert_eq!(empty["totalOrders"], 0);
    assert_eq!(empty["averageOrderAmount"], 0.0);
    assert_eq!(empty["averageCreationTimeMs"], 0.0);

    create_order(&server, "Ana", 100.0).await;
    create_order(&server, "Bob", 200.0).await;

    let response = server.get("/api/metrics").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let metrics: Value = response.json();
    assert_eq!(metrics["totalOrders"], 2);
    assert_eq!(metrics["averageOrderAmount"], 150.0);
    assert!(metrics["averageCreationTimeMs"].as_f64().unwrap() >= 0.0);
}

#[tokio::test]
async fn test_health_and_request_id() {
    let server = create_test_server();

    let response = server.get("/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert!(!response.header("x-request-id").is_empty());
}

#[tokio::test]
async fn test_prometheus_route_absent_without_recorder() {
    let server = create_test_server();

    let response = server.get("/metrics").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_store_failure_is_opaque() {
    let server = server_over(Arc::new(UnreachableStore));

    let response = server
        .post("/api/orders")
        .json(&json!({ "customerName": "Ana", "totalAmount": 10.0 }))
        .await;
    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = response.json();
    assert_eq!(body["error"], "An internal server error occurred");
    assert_eq!(body["statusCode"], 500);
    assert!(body["timestamp"].is_string());
    assert!(!response.text().contains("10.0.0.7"));

    let response = server.get("/api/orders").await;
    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

    let response = server.get("/health").await;
    assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);
}
