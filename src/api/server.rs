//! # Orders Server
//!
//! Router assembly and the HTTP server lifecycle.
//!
//! Layer order, outermost first: panic catcher, request id and completion log,
//! `TraceLayer`, request timeout.

use super::handlers::{
    create_order, get_metrics, get_order, health, list_orders, prometheus_metrics, update_order, AppState,
};
use super::middleware::{handle_panic, request_id_middleware};
use crate::core::config::OrdersConfig;
use crate::core::error::{OrdersError, OrdersResult};
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Build the application router
pub fn build_router(state: AppState, config: &OrdersConfig) -> Router {
    let mut router = Router::new()
        .route("/api/orders", post(create_order).get(list_orders))
        .route("/api/orders/:id", get(get_order).put(update_order))
        .route("/api/metrics", get(get_metrics))
        .route("/health", get(health));

    if state.prometheus.is_some() {
        router = router.route(
            &config.observability.metrics.endpoint_path,
            get(prometheus_metrics),
        );
    }

    router.with_state(state).layer(
        ServiceBuilder::new()
            .layer(CatchPanicLayer::custom(handle_panic))
            .layer(axum::middleware::from_fn(request_id_middleware))
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(config.server.request_timeout)),
    )
}

/// HTTP server for the order API
pub struct OrdersServer {
    config: OrdersConfig,
    app: Router,
}

impl OrdersServer {
    pub fn new(config: OrdersConfig, state: AppState) -> Self {
        let app = build_router(state, &config);
        Self { config, app }
    }

    pub fn router(&self) -> Router {
        self.app.clone()
    }

    /// Bind and serve until SIGINT or SIGTERM, then drain in-flight requests
    pub async fn start(self) -> OrdersResult<()> {
        let bind_addr: SocketAddr = format!("{}:{}", self.config.server.bind_address, self.config.server.port)
            .parse()
            .map_err(|e| OrdersError::config(format!("Invalid bind address: {}", e)))?;

        let listener = TcpListener::bind(bind_addr)
            .await
            .map_err(|e| OrdersError::internal(format!("Failed to bind {}: {}", bind_addr, e)))?;

        info!(address = %bind_addr, "Orders API listening");

        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| OrdersError::internal(format!("Server error: {}", e)))?;

        info!("Orders API stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
