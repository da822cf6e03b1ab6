//! # HTTP API
//!
//! axum surface for the order service: JSON handlers, request middleware and the
//! server with graceful shutdown.

pub mod handlers;
pub mod middleware;
pub mod server;

pub use handlers::{AppState, ListParams};
pub use server::{build_router, OrdersServer};
