//! # Observability Module
//!
//! Structured logging setup and the Prometheus metrics recorder.

// Structured logging
pub mod logging;

// Metric names and Prometheus export
pub mod metrics;

pub use self::logging::init_logging;
pub use self::metrics::install_prometheus_recorder;
