//! # Error Handling Module
//!
//! Error taxonomy for the order service, built on `thiserror`.
//!
//! ## Propagation policy
//! - Validation failures are detected before the service layer runs and short-circuit
//!   with the full list of field errors.
//! - A missing order is a normal outcome: services return `Option`, and only the HTTP
//!   layer turns `None` into [`OrdersError::NotFound`].
//! - Everything else (persistence failures, configuration problems, internal bugs) is
//!   logged once at the outermost boundary and rendered as an opaque 500 response.
//!   Internal details never reach the caller.

use crate::core::validation::FieldError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Main result type used throughout the service
pub type OrdersResult<T> = Result<T, OrdersError>;

/// Message rendered for every failure that is not the caller's fault
pub const INTERNAL_ERROR_MESSAGE: &str = "An internal server error occurred";

/// Error types for the order service
#[derive(Debug, Error, Clone)]
pub enum OrdersError {
    /// Malformed domain input (field + message pairs)
    #[error("Validation failed: {}", format_field_errors(.errors))]
    Validation { errors: Vec<FieldError> },

    /// Request that cannot be interpreted (bad id, unreadable body or query)
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    /// Resource does not exist (HTTP boundary only)
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// Store unreachable or write failure
    #[error("Persistence error: {message}")]
    Persistence { message: String },

    /// Invalid or missing configuration
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Unexpected failures
    #[error("Internal server error: {message}")]
    Internal { message: String },
}

fn format_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl OrdersError {
    /// Create a validation error from collected field errors
    pub fn validation(errors: Vec<FieldError>) -> Self {
        Self::Validation { errors }
    }

    pub fn bad_request<S: Into<String>>(message: S) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn persistence<S: Into<String>>(message: S) -> Self {
        Self::Persistence {
            message: message.into(),
        }
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// HTTP status code returned to clients for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Persistence { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Configuration { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// String representation of the error type, used in logs
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation_error",
            Self::BadRequest { .. } => "bad_request",
            Self::NotFound { .. } => "not_found",
            Self::Persistence { .. } => "persistence_error",
            Self::Configuration { .. } => "configuration_error",
            Self::Internal { .. } => "internal_error",
        }
    }

    /// Whether the caller caused this error (4xx)
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

impl From<sqlx::Error> for OrdersError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Configuration(e) => Self::config(e.to_string()),
            other => Self::persistence(other.to_string()),
        }
    }
}

impl From<std::io::Error> for OrdersError {
    fn from(err: std::io::Error) -> Self {
        Self::internal(format!("I/O error: {}", err))
    }
}

impl From<serde_yaml::Error> for OrdersError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::config(format!("YAML error: {}", err))
    }
}

/// Body of the uniform opaque failure response
pub fn internal_error_body() -> serde_json::Value {
    json!({
        "error": INTERNAL_ERROR_MESSAGE,
        "statusCode": StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
        "timestamp": chrono::Utc::now(),
    })
}

/// Render errors as HTTP responses.
///
/// Server-side failures are logged here, once, and replaced by the opaque body.
impl IntoResponse for OrdersError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match &self {
            Self::Validation { errors } => json!({ "errors": errors }),
            Self::BadRequest { message } | Self::NotFound { message } => {
                json!({ "message": message })
            }
            _ => {
                tracing::error!(
                    error_type = self.error_type(),
                    error = %self,
                    "Unhandled error while processing request"
                );
                internal_error_body()
            }
        };

        (status, Json(body)).into_response()
    }
}
