//! # Orders API - Main Entry Point
//!
//! Startup sequence: load configuration, install logging and the metrics recorder,
//! open the order store, compose the service stack and serve until shutdown.

use orders_api::core::error::OrdersResult;
use orders_api::observability::{init_logging, install_prometheus_recorder};
use orders_api::orders::{build_order_service, build_order_store};
use orders_api::{AppState, OrdersConfig, OrdersServer};
use tracing::{error, info};

const CONFIG_PATH_ENV: &str = "ORDERS_CONFIG_PATH";
const DEFAULT_CONFIG_PATH: &str = "config/orders.yaml";

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        // Logging may not be up yet when configuration fails
        eprintln!("orders-api failed: {}", e);
        error!(error = %e, "orders-api failed");
        std::process::exit(1);
    }
}

async fn run() -> OrdersResult<()> {
    let config_path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = OrdersConfig::load_or_default(&config_path).await?;

    init_logging(&config.observability.logging)?;
    info!(version = env!("CARGO_PKG_VERSION"), config = %config_path, "Starting orders API");

    let store = build_order_store(&config.store).await?;
    let orders = build_order_service(&config, store)?;

    let mut state = AppState::new(orders);
    if config.observability.metrics.prometheus_enabled {
        state = state.with_prometheus(install_prometheus_recorder()?);
    }

    OrdersServer::new(config, state).start().await?;

    info!("Orders API shutdown complete");
    Ok(())
}
