//! Gym manager (tenant) registration and login
//!
//! Login gates only on credentials and the account-active flag. A tenant
//! with a non-active subscription still gets a token; the subscription
//! gate fires in `gym_auth` middleware on every tenant operation instead.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::FromRow;
use uuid::Uuid;

use gymstack_shared::types::PrincipalKind;

use crate::auth::{hash_password, validate_password_strength, verify_password, AuthGym};
use crate::error::{ApiError, ApiResult};
use crate::routes::validate_email;
use crate::state::AppState;

/// Gym manager row without the password hash.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct GymManagerRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub gym_name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub is_active: bool,
    pub subscription_status: String,
    pub current_subscription_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub const GYM_MANAGER_COLUMNS: &str = "id, name, email, gym_name, phone, address, is_active, \
     subscription_status, current_subscription_id, created_at, updated_at";

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub gym_name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

fn summary(row: &GymManagerRow) -> serde_json::Value {
    json!({
        "id": row.id,
        "name": row.name,
        "email": row.email,
        "gym_name": row.gym_name,
        "subscription_status": row.subscription_status,
    })
}

/// Create a tenant account. `subscription_status` starts as `expired`
/// (schema default): registering grants a login, not platform access.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let mut errors = Vec::new();
    if body.name.trim().is_empty() {
        errors.push("name is required".to_string());
    }
    if body.gym_name.trim().is_empty() {
        errors.push("gym_name is required".to_string());
    }
    if let Err(e) = validate_email(&body.email) {
        errors.push(e);
    }
    if let Err(e) = validate_password_strength(&body.password) {
        errors.push(e);
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let existing: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM gym_managers WHERE email = $1")
        .bind(body.email.to_lowercase())
        .fetch_optional(&state.pool)
        .await?;
    if existing.is_some() {
        return Err(ApiError::Conflict("email already registered".to_string()));
    }

    let password_hash = hash_password(&body.password)
        .map_err(|e| ApiError::Internal(format!("failed to hash password: {}", e)))?;

    let row: GymManagerRow = sqlx::query_as(&format!(
        r#"
        INSERT INTO gym_managers (id, name, email, password_hash, gym_name, phone, address)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING {}
        "#,
        GYM_MANAGER_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(body.name.trim())
    .bind(body.email.to_lowercase())
    .bind(&password_hash)
    .bind(body.gym_name.trim())
    .bind(&body.phone)
    .bind(&body.address)
    .fetch_one(&state.pool)
    .await?;

    let token = state
        .jwt_manager
        .generate_token(row.id, PrincipalKind::GymManager)
        .map_err(|e| ApiError::Internal(format!("failed to issue token: {}", e)))?;

    tracing::info!(gym_id = %row.id, gym_name = %row.gym_name, "Tenant account created");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "account created",
            "token": token,
            "gym_manager": summary(&row),
        })),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    #[derive(FromRow)]
    struct GymCredsRow {
        id: Uuid,
        name: String,
        email: String,
        gym_name: String,
        is_active: bool,
        subscription_status: String,
        password_hash: String,
    }

    let row: Option<GymCredsRow> = sqlx::query_as(
        r#"
        SELECT id, name, email, gym_name, is_active, subscription_status, password_hash
        FROM gym_managers WHERE email = $1
        "#,
    )
    .bind(body.email.to_lowercase())
    .fetch_optional(&state.pool)
    .await?;

    let row = row.ok_or_else(|| {
        ApiError::Unauthenticated("invalid email or password".to_string())
    })?;

    if !row.is_active {
        return Err(ApiError::Forbidden("account is disabled".to_string()));
    }

    if !verify_password(&body.password, &row.password_hash) {
        return Err(ApiError::Unauthenticated(
            "invalid email or password".to_string(),
        ));
    }

    let token = state
        .jwt_manager
        .generate_token(row.id, PrincipalKind::GymManager)
        .map_err(|e| ApiError::Internal(format!("failed to issue token: {}", e)))?;

    Ok(Json(json!({
        "message": "login successful",
        "token": token,
        "gym_manager": {
            "id": row.id,
            "name": row.name,
            "email": row.email,
            "gym_name": row.gym_name,
            "subscription_status": row.subscription_status,
        },
    })))
}

pub async fn profile(
    State(state): State<AppState>,
    Extension(gym): Extension<AuthGym>,
) -> ApiResult<Json<GymManagerRow>> {
    let row: Option<GymManagerRow> = sqlx::query_as(&format!(
        "SELECT {} FROM gym_managers WHERE id = $1",
        GYM_MANAGER_COLUMNS
    ))
    .bind(gym.id)
    .fetch_optional(&state.pool)
    .await?;

    row.map(Json)
        .ok_or_else(|| ApiError::NotFound("gym manager not found".to_string()))
}
