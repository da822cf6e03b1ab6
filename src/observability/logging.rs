//! # Structured Logging
//!
//! Installs the global `tracing` subscriber. `RUST_LOG`, when set, takes precedence
//! over the configured level.

use crate::core::config::LoggingConfig;
use crate::core::error::{OrdersError, OrdersResult};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Text,
}

impl LogFormat {
    pub fn parse(format: &str) -> OrdersResult<Self> {
        match format.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" => Ok(Self::Text),
            other => Err(OrdersError::config(format!("Invalid log format: {}", other))),
        }
    }
}

/// Build the level filter: `RUST_LOG` first, then the configured level
fn build_filter(config: &LoggingConfig) -> OrdersResult<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.level)
            .map_err(|e| OrdersError::config(format!("Invalid log level '{}': {}", config.level, e))),
    }
}

/// Initialize the tracing subscriber.
///
/// Calling this twice is harmless: the second subscriber is dropped with a warning.
pub fn init_logging(config: &LoggingConfig) -> OrdersResult<()> {
    let env_filter = build_filter(config)?;
    let format = LogFormat::parse(&config.format)?;

    let result = match format {
        LogFormat::Json => Registry::default()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_target(true),
            )
            .try_init(),
        LogFormat::Text => Registry::default()
            .with(env_filter)
            .with(fmt::layer().with_target(true).with_thread_ids(true))
            .try_init(),
    };

    if result.is_err() {
        warn!("Tracing subscriber already initialized, skipping initialization");
        return Ok(());
    }

    info!(level = %config.level, format = %config.format, "Structured logging initialized");
    Ok(())
}
