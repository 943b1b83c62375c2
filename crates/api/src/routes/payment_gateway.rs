//! Payment-gateway routes (admin-only)
//!
//! Thin passthrough over the injected gateway. Single attempt per call; a
//! gateway failure is surfaced as a 400.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stripe/create-intent", post(create_intent))
        .route("/stripe/confirm", post(confirm))
        .route("/local/process", post(process_local))
}

#[derive(Debug, Deserialize)]
pub struct CreateIntentRequest {
    pub amount: f64,
    pub currency: Option<String>,
    pub description: Option<String>,
}

async fn create_intent(
    State(state): State<AppState>,
    Json(body): Json<CreateIntentRequest>,
) -> ApiResult<impl IntoResponse> {
    if body.amount <= 0.0 {
        return Err(ApiError::validation("amount must be positive"));
    }

    let outcome = state
        .gateway
        .create_charge(
            body.amount,
            body.currency.as_deref().unwrap_or("usd"),
            body.description.as_deref().unwrap_or(""),
        )
        .await?;

    Ok(Json(json!({
        "client_secret": outcome.client_secret,
        "payment_intent_id": outcome.gateway_id,
    })))
}

#[derive(Debug, Deserialize)]
pub struct ConfirmRequest {
    pub payment_intent_id: String,
}

async fn confirm(
    State(state): State<AppState>,
    Json(body): Json<ConfirmRequest>,
) -> ApiResult<impl IntoResponse> {
    let settled = state.gateway.confirm_charge(&body.payment_intent_id).await?;
    if !settled {
        return Err(ApiError::Gateway("payment not completed".to_string()));
    }
    Ok(Json(json!({ "message": "payment confirmed" })))
}

#[derive(Debug, Deserialize)]
pub struct LocalPaymentRequest {
    pub amount: f64,
    pub payment_method: Option<String>,
    pub description: Option<String>,
}

async fn process_local(Json(body): Json<LocalPaymentRequest>) -> ApiResult<impl IntoResponse> {
    if body.amount <= 0.0 {
        return Err(ApiError::validation("amount must be positive"));
    }

    // Manual settlement: nothing external to call, just issue a reference.
    let payment_id = format!("local_{}", Uuid::new_v4().simple());
    tracing::info!(
        amount = body.amount,
        method = body.payment_method.as_deref().unwrap_or("local"),
        "Recorded local payment reference"
    );

    Ok(Json(json!({
        "message": "payment recorded",
        "payment_id": payment_id,
    })))
}
