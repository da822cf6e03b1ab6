//! # Order Handlers
//!
//! Request extraction, validation and status mapping. Handlers talk to the
//! [`OrderService`] trait object only, so the cached and direct services are
//! interchangeable here.

use crate::core::error::{OrdersError, OrdersResult};
use crate::core::types::{
    CreateOrderRequest, OrderId, OrderListQuery, OrderMetrics, OrderResponse, UpdateOrderRequest,
    DEFAULT_PAGE_SIZE,
};
use crate::core::validation::{validate_create, validate_update};
use crate::orders::OrderService;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::warn;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub orders: Arc<dyn OrderService>,
    pub prometheus: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(orders: Arc<dyn OrderService>) -> Self {
        Self {
            orders,
            prometheus: None,
        }
    }

    pub fn with_prometheus(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus = Some(handle);
        self
    }
}

/// Query string of `GET /api/orders`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub customer_name: Option<String>,
}

impl ListParams {
    pub fn into_query(self) -> OrderListQuery {
        OrderListQuery::new(
            self.page.unwrap_or(1),
            self.page_size.unwrap_or(DEFAULT_PAGE_SIZE as i64),
            self.customer_name,
        )
    }
}

fn parse_order_id(path: Result<Path<i64>, PathRejection>) -> OrdersResult<OrderId> {
    match path {
        Ok(Path(id)) if id > 0 => Ok(id),
        _ => Err(OrdersError::bad_request("Order id must be a positive integer")),
    }
}

fn body_or_bad_request<T>(payload: Result<Json<T>, JsonRejection>) -> OrdersResult<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| OrdersError::bad_request(rejection.body_text()))
}

/// POST /api/orders
pub async fn create_order(
    State(state): State<AppState>,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> OrdersResult<Response> {
    let request = body_or_bad_request(payload)?;

    let errors = validate_create(&request);
    if !errors.is_empty() {
        return Err(OrdersError::validation(errors));
    }

    let created = state.orders.create_order(request).await?;
    let location = format!("/api/orders/{}", created.id);

    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(created)).into_response())
}

/// GET /api/orders
pub async fn list_orders(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> OrdersResult<Json<Vec<OrderResponse>>> {
    let Query(params) = params.map_err(|rejection| OrdersError::bad_request(rejection.body_text()))?;
    let orders = state.orders.list_orders(&params.into_query()).await?;
    Ok(Json(orders))
}

/// GET /api/orders/:id
pub async fn get_order(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> OrdersResult<Json<OrderResponse>> {
    let id = parse_order_id(path)?;

    state
        .orders
        .get_order_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| OrdersError::not_found(format!("Order {} not found", id)))
}

/// PUT /api/orders/:id
pub async fn update_order(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateOrderRequest>, JsonRejection>,
) -> OrdersResult<Json<OrderResponse>> {
    let id = parse_order_id(path)?;
    let request = body_or_bad_request(payload)?;

    let errors = validate_update(&request);
    if !errors.is_empty() {
        return Err(OrdersError::validation(errors));
    }

    state
        .orders
        .update_order(id, request)
        .await?
        .map(Json)
        .ok_or_else(|| OrdersError::not_found(format!("Order {} not found", id)))
}

/// GET /api/metrics
pub async fn get_metrics(State(state): State<AppState>) -> OrdersResult<Json<OrderMetrics>> {
    Ok(Json(state.orders.get_metrics().await?))
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Response {
    match state.orders.health_check().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "healthy" }))).into_response(),
        Err(e) => {
            warn!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unhealthy" })),
            )
                .into_response()
        }
    }
}

/// Prometheus scrape endpoint
pub async fn prometheus_metrics(State(state): State<AppState>) -> Response {
    match &state.prometheus {
        Some(handle) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
