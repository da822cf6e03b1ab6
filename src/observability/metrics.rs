//! # Metrics
//!
//! Metric names recorded through the `metrics` facade, and the Prometheus recorder
//! that exports them. Without an installed recorder every `counter!` and
//! `histogram!` call is a no-op, which is what the tests rely on.

use crate::core::error::{OrdersError, OrdersResult};
use metrics::{describe_counter, describe_histogram, Unit};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use tracing::info;

/// Cache lookups, labelled by `namespace` (`order`, `list`) and `outcome` (`hit`, `miss`)
pub const CACHE_REQUESTS_TOTAL: &str = "orders_cache_requests_total";

/// List invalidation passes, labelled by `strategy`
pub const CACHE_INVALIDATIONS_TOTAL: &str = "orders_cache_invalidations_total";

/// Cache operations that failed and were bypassed, labelled by `operation`
pub const CACHE_ERRORS_TOTAL: &str = "orders_cache_errors_total";

/// Orders successfully persisted
pub const ORDERS_CREATED_TOTAL: &str = "orders_created_total";

/// Wall-clock duration of order creation
pub const ORDER_CREATION_DURATION_SECONDS: &str = "orders_creation_duration_seconds";

const CREATION_BUCKETS: &[f64] = &[0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5];

/// Install the global Prometheus recorder and return the handle used to render
/// the scrape endpoint.
pub fn install_prometheus_recorder() -> OrdersResult<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(ORDER_CREATION_DURATION_SECONDS.to_string()),
            CREATION_BUCKETS,
        )
        .map_err(|e| OrdersError::config(format!("Failed to set histogram buckets: {}", e)))?
        .install_recorder()
        .map_err(|e| OrdersError::config(format!("Failed to install Prometheus recorder: {}", e)))?;

    describe_metrics();
    info!("Prometheus metrics recorder installed");

    Ok(handle)
}

fn describe_metrics() {
    describe_counter!(CACHE_REQUESTS_TOTAL, "Order cache lookups by namespace and outcome");
    describe_counter!(CACHE_INVALIDATIONS_TOTAL, "List cache invalidation passes");
    describe_counter!(CACHE_ERRORS_TOTAL, "Cache operations that failed and were bypassed");
    describe_counter!(ORDERS_CREATED_TOTAL, "Orders persisted");
    describe_histogram!(
        ORDER_CREATION_DURATION_SECONDS,
        Unit::Seconds,
        "Time spent creating an order"
    );
}
