//! Platform admin registration and login

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use gymstack_shared::types::PrincipalKind;

use crate::auth::{hash_password, validate_password_strength, verify_password, AuthAdmin};
use crate::error::{ApiError, ApiResult};
use crate::routes::validate_email;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let mut errors = Vec::new();
    if body.name.trim().is_empty() {
        errors.push("name is required".to_string());
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

    let existing: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM admins WHERE email = $1")
        .bind(&body.email)
        .fetch_optional(&state.pool)
        .await?;
    if existing.is_some() {
        return Err(ApiError::Conflict("email already registered".to_string()));
    }

    let password_hash = hash_password(&body.password)
        .map_err(|e| ApiError::Internal(format!("failed to hash password: {}", e)))?;

    let admin: AuthAdmin = sqlx::query_as(
        r#"
        INSERT INTO admins (id, name, email, password_hash)
        VALUES ($1, $2, $3, $4)
        RETURNING id, name, email
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(body.name.trim())
    .bind(body.email.to_lowercase())
    .bind(&password_hash)
    .fetch_one(&state.pool)
    .await?;

    let token = state
        .jwt_manager
        .generate_token(admin.id, PrincipalKind::Admin)
        .map_err(|e| ApiError::Internal(format!("failed to issue token: {}", e)))?;

    tracing::info!(admin_id = %admin.id, "Admin account created");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "account created",
            "token": token,
            "admin": admin,
        })),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    #[derive(sqlx::FromRow)]
    struct AdminCredsRow {
        id: Uuid,
        name: String,
        email: String,
        password_hash: String,
    }

    let row: Option<AdminCredsRow> =
        sqlx::query_as("SELECT id, name, email, password_hash FROM admins WHERE email = $1")
            .bind(body.email.to_lowercase())
            .fetch_optional(&state.pool)
            .await?;

    let row = row.ok_or_else(|| {
        ApiError::Unauthenticated("invalid email or password".to_string())
    })?;

    if !verify_password(&body.password, &row.password_hash) {
        return Err(ApiError::Unauthenticated(
            "invalid email or password".to_string(),
        ));
    }

    let token = state
        .jwt_manager
        .generate_token(row.id, PrincipalKind::Admin)
        .map_err(|e| ApiError::Internal(format!("failed to issue token: {}", e)))?;

    Ok(Json(json!({
        "message": "login successful",
        "token": token,
        "admin": { "id": row.id, "name": row.name, "email": row.email },
    })))
}

pub async fn profile(Extension(admin): Extension<AuthAdmin>) -> Json<AuthAdmin> {
    Json(admin)
}
