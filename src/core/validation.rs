//! # Request Validation
//!
//! Domain rules for order payloads. Every violated rule is reported, not just the
//! first one, so the HTTP layer can return the complete list of field errors.

use crate::core::types::{CreateOrderRequest, UpdateOrderRequest};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Maximum customer name length, in characters
pub const MAX_CUSTOMER_NAME_LENGTH: usize = 100;

/// Exclusive upper bound for an order amount
pub fn max_total_amount() -> Decimal {
    Decimal::new(1_000_000, 0)
}

/// A single field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validate a create payload
pub fn validate_create(request: &CreateOrderRequest) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if request.customer_name.trim().is_empty() {
        errors.push(FieldError::new("customerName", "Customer name is required"));
    } else if request.customer_name.chars().count() > MAX_CUSTOMER_NAME_LENGTH {
        errors.push(FieldError::new(
            "customerName",
            format!("Customer name must be at most {} characters", MAX_CUSTOMER_NAME_LENGTH),
        ));
    }

    validate_amount(request.total_amount, &mut errors);
    errors
}

/// Validate an update payload
pub fn validate_update(request: &UpdateOrderRequest) -> Vec<FieldError> {
    let mut errors = Vec::new();
    validate_amount(request.total_amount, &mut errors);
    errors
}

fn validate_amount(amount: Decimal, errors: &mut Vec<FieldError>) {
    if amount <= Decimal::ZERO {
        errors.push(FieldError::new("totalAmount", "Total amount must be greater than zero"));
    } else if amount >= max_total_amount() {
        errors.push(FieldError::new(
            "totalAmount",
            format!("Total amount must be less than {}", max_total_amount()),
        ));
    }
}
