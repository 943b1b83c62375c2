//! Public (unauthenticated) surface: plan browsing, self-service
//! subscribe, and health checks
//!
//! Public responses use the `{success, data}` envelope.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use gymstack_billing::NewGymSubscription;
use gymstack_shared::types::{PlatformPaymentMethod, PrincipalKind};

use crate::auth::{hash_password, validate_password_strength};
use crate::error::{ApiError, ApiResult};
use crate::routes::validate_email;
use crate::state::AppState;

pub async fn root() -> impl IntoResponse {
    Json(json!({
        "status": "OK",
        "message": "Gymstack API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": { "admin": "/api/admin", "gym": "/api/gym", "health": "/api/health" },
    }))
}

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "OK", "message": "Server is running" }))
}

pub async fn list_plans(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let plans = state.plans.list(Some(true)).await?;
    Ok(Json(json!({ "success": true, "data": plans })))
}

pub async fn get_plan(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let plan = state.plans.get_active(id).await?;
    Ok(Json(json!({ "success": true, "data": plan })))
}

/// Landing-page subscribe: registration and subscription in one call.
/// A known email attaches the subscription to the existing account; an
/// unknown one requires the full registration payload.
#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    // Registration data (if new user)
    pub name: Option<String>,
    pub gym_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    // Subscription data
    pub plan_id: Option<Uuid>,
    pub payment_method: Option<PlatformPaymentMethod>,
    pub payment_id: Option<String>,
    #[serde(default)]
    pub auto_renew: bool,
}

pub async fn subscribe(
    State(state): State<AppState>,
    Json(body): Json<SubscribeRequest>,
) -> ApiResult<impl IntoResponse> {
    let plan_id = body
        .plan_id
        .ok_or_else(|| ApiError::validation("a plan must be selected"))?;
    let email = body
        .email
        .as_deref()
        .map(str::to_lowercase)
        .ok_or_else(|| ApiError::validation("email is required"))?;
    validate_email(&email).map_err(|e| ApiError::validation(&e))?;

    // The public flow only sells active plans.
    let plan = state.plans.get_active(plan_id).await?;

    #[derive(sqlx::FromRow)]
    struct ExistingGymRow {
        id: Uuid,
        name: String,
        gym_name: String,
    }

    let existing: Option<ExistingGymRow> =
        sqlx::query_as("SELECT id, name, gym_name FROM gym_managers WHERE email = $1")
            .bind(&email)
            .fetch_optional(&state.pool)
            .await?;

    let (gym_id, gym_name, name) = match existing {
        Some(gym) => (gym.id, gym.gym_name, gym.name),
        None => {
            let mut errors = Vec::new();
            let name = body.name.as_deref().unwrap_or("").trim().to_string();
            let gym_name = body.gym_name.as_deref().unwrap_or("").trim().to_string();
            if name.is_empty() {
                errors.push("name is required for registration".to_string());
            }
            if gym_name.is_empty() {
                errors.push("gym_name is required for registration".to_string());
            }
            match body.password.as_deref() {
                None => errors.push("password is required for registration".to_string()),
                Some(p) => {
                    if let Err(e) = validate_password_strength(p) {
                        errors.push(e);
                    }
                }
            }
            if !errors.is_empty() {
                return Err(ApiError::Validation(errors));
            }

            let password_hash = hash_password(body.password.as_deref().unwrap_or_default())
                .map_err(|e| ApiError::Internal(format!("failed to hash password: {}", e)))?;

            let id: Uuid = sqlx::query_scalar(
                r#"
                INSERT INTO gym_managers (id, name, email, password_hash, gym_name, phone, address)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING id
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(&name)
            .bind(&email)
            .bind(&password_hash)
            .bind(&gym_name)
            .bind(&body.phone)
            .bind(&body.address)
            .fetch_one(&state.pool)
            .await?;

            tracing::info!(gym_id = %id, "Tenant registered via public subscribe");
            (id, gym_name, name)
        }
    };

    let subscription = state
        .subscriptions
        .create_for_plan(
            NewGymSubscription {
                gym_id,
                plan_id: plan.id,
                payment_method: body.payment_method.unwrap_or(PlatformPaymentMethod::Local),
                payment_gateway_id: body.payment_id.clone(),
                auto_renew: body.auto_renew,
            },
            &plan,
        )
        .await?;

    let token = state
        .jwt_manager
        .generate_token(gym_id, PrincipalKind::GymManager)
        .map_err(|e| ApiError::Internal(format!("failed to issue token: {}", e)))?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "subscribed",
            "token": token,
            "subscription": subscription,
            "gym_manager": {
                "id": gym_id,
                "name": name,
                "email": email,
                "gym_name": gym_name,
                "subscription_status": "active",
            },
        })),
    ))
}
