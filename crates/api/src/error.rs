//! Centralized API error handling
//!
//! Controllers never swallow errors; everything funnels through
//! [`ApiError`] and its status mapping. Internal detail is suppressed
//! outside debug builds.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use gymstack_billing::BillingError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing/invalid/expired token, unknown principal, or deactivated
    /// tenant account.
    #[error("{0}")]
    Unauthenticated(String),

    /// Authenticated but not allowed: wrong role or ownership mismatch.
    #[error("{0}")]
    Forbidden(String),

    /// Tenant authenticated fine but its platform subscription is not
    /// active; the current status is echoed back.
    #[error("subscription is not active")]
    SubscriptionInactive { status: String },

    #[error("{0}")]
    NotFound(String),

    /// Field-level validation failures.
    #[error("validation failed")]
    Validation(Vec<String>),

    /// Duplicate unique field (e.g. email already registered).
    #[error("{0}")]
    Conflict(String),

    /// Payment gateway rejected or failed the operation.
    #[error("{0}")]
    Gateway(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(message: &str) -> Self {
        ApiError::Validation(vec![message.to_string()])
    }
}

impl From<BillingError> for ApiError {
    fn from(err: BillingError) -> Self {
        match err {
            BillingError::Database(e) => ApiError::Database(e),
            BillingError::NotFound(m) => ApiError::NotFound(m),
            BillingError::Validation(errors) => ApiError::Validation(errors),
            BillingError::Conflict(m) => ApiError::Conflict(m),
            BillingError::Gateway(m) => ApiError::Gateway(m),
            BillingError::Internal(m) => ApiError::Internal(m),
        }
    }
}

/// Postgres unique-violation code, surfaced as a 400 duplicate error.
const UNIQUE_VIOLATION: &str = "23505";

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) | ApiError::SubscriptionInactive { .. } => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) | ApiError::Conflict(_) | ApiError::Gateway(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Database(e) if is_unique_violation(e) => StatusCode::BAD_REQUEST,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .and_then(|db| db.code())
        .map(|code| code == UNIQUE_VIOLATION)
        .unwrap_or(false)
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let is_dev = cfg!(debug_assertions);

        let body = match &self {
            ApiError::SubscriptionInactive { status: sub_status } => json!({
                "message": "subscription is not active, please renew",
                "subscription_status": sub_status,
            }),
            ApiError::Validation(errors) => json!({
                "success": false,
                "message": "Validation Error",
                "errors": errors,
            }),
            ApiError::Database(e) if is_unique_violation(e) => {
                let field = e
                    .as_database_error()
                    .and_then(|db| db.constraint())
                    .unwrap_or("field");
                json!({ "message": format!("{} already exists", field) })
            }
            ApiError::Database(e) => {
                tracing::error!(error = %e, "Database error");
                if is_dev {
                    json!({ "message": format!("database error: {}", e) })
                } else {
                    json!({ "message": "Internal server error" })
                }
            }
            ApiError::Internal(m) => {
                tracing::error!(error = %m, "Internal error");
                if is_dev {
                    json!({ "message": m })
                } else {
                    json!({ "message": "Internal server error" })
                }
            }
            other => json!({ "message": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use axum::body::to_bytes;

    async fn body_json(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn unauthenticated_maps_to_401() {
        let (status, body) = body_json(ApiError::Unauthenticated(
            "authentication token required".to_string(),
        ))
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "authentication token required");
    }

    #[tokio::test]
    async fn subscription_inactive_echoes_status_with_403() {
        let (status, body) = body_json(ApiError::SubscriptionInactive {
            status: "expired".to_string(),
        })
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["subscription_status"], "expired");
    }

    #[tokio::test]
    async fn validation_lists_field_errors() {
        let (status, body) = body_json(ApiError::Validation(vec![
            "price is required".to_string(),
            "duration is required".to_string(),
        ]))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"].as_array().unwrap().len(), 2);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn not_found_maps_to_404() {
        let (status, _) = body_json(ApiError::NotFound("member not found".to_string())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn conflict_maps_to_400() {
        let (status, body) =
            body_json(ApiError::Conflict("email already registered".to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "email already registered");
    }
}
