//! Billing error types

use thiserror::Error;

pub type BillingResult<T> = Result<T, BillingError>;

#[derive(Debug, Error)]
pub enum BillingError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Referenced entity missing, or present but outside the caller's
    /// tenant scope (deliberately indistinguishable).
    #[error("{0}")]
    NotFound(String),

    /// Request-level validation failures, one message per offending field.
    #[error("validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("{0}")]
    Conflict(String),

    #[error("payment gateway error: {0}")]
    Gateway(String),

    #[error("{0}")]
    Internal(String),
}

impl BillingError {
    pub fn not_found(what: &str) -> Self {
        BillingError::NotFound(format!("{} not found", what))
    }

    pub fn validation(message: &str) -> Self {
        BillingError::Validation(vec![message.to_string()])
    }
}
