//! Tenant member CRUD
//!
//! Every query here filters by the tenant scope attached by `gym_auth`;
//! fetch-by-id additionally re-verifies ownership of the returned row.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::FromRow;
use uuid::Uuid;

use gymstack_billing::TenantScope;
use gymstack_shared::pagination::{PageInfo, PageQuery};

use crate::auth::verify_tenant_access;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_one).put(update).delete(delete_one))
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MemberRow {
    pub id: Uuid,
    pub gym_id: Uuid,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub emergency_contact: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub is_active: Option<bool>,
}

async fn list(
    State(state): State<AppState>,
    Extension(scope): Extension<TenantScope>,
    Query(query): Query<ListQuery>,
) -> ApiResult<impl IntoResponse> {
    let page = PageQuery {
        page: query.page,
        limit: query.limit,
    };
    let search = query
        .search
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(|s| format!("%{}%", s));

    let members: Vec<MemberRow> = sqlx::query_as(
        r#"
        SELECT * FROM gym_members
        WHERE gym_id = $1
          AND ($2::TEXT IS NULL OR name ILIKE $2 OR email ILIKE $2 OR phone ILIKE $2)
          AND ($3::BOOLEAN IS NULL OR is_active = $3)
        ORDER BY created_at DESC
        LIMIT $4 OFFSET $5
        "#,
    )
    .bind(scope.gym_id())
    .bind(&search)
    .bind(query.is_active)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(&state.pool)
    .await?;

    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM gym_members
        WHERE gym_id = $1
          AND ($2::TEXT IS NULL OR name ILIKE $2 OR email ILIKE $2 OR phone ILIKE $2)
          AND ($3::BOOLEAN IS NULL OR is_active = $3)
        "#,
    )
    .bind(scope.gym_id())
    .bind(&search)
    .bind(query.is_active)
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(json!({
        "members": members,
        "pagination": PageInfo::new(page, total),
    })))
}

async fn get_one(
    State(state): State<AppState>,
    Extension(scope): Extension<TenantScope>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MemberRow>> {
    let member: Option<MemberRow> =
        sqlx::query_as("SELECT * FROM gym_members WHERE id = $1 AND gym_id = $2")
            .bind(id)
            .bind(scope.gym_id())
            .fetch_optional(&state.pool)
            .await?;

    let member = member.ok_or_else(|| ApiError::NotFound("member not found".to_string()))?;
    verify_tenant_access(member.gym_id, Some(scope))?;
    Ok(Json(member))
}

#[derive(Debug, Deserialize)]
pub struct NewMemberRequest {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub emergency_contact: Option<String>,
}

async fn create(
    State(state): State<AppState>,
    Extension(scope): Extension<TenantScope>,
    Json(body): Json<NewMemberRequest>,
) -> ApiResult<impl IntoResponse> {
    let mut errors = Vec::new();
    if body.name.trim().is_empty() {
        errors.push("name is required".to_string());
    }
    if body.phone.trim().is_empty() {
        errors.push("phone is required".to_string());
    }
    if let Some(gender) = body.gender.as_deref() {
        if gender != "male" && gender != "female" {
            errors.push("gender must be male or female".to_string());
        }
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let member: MemberRow = sqlx::query_as(
        r#"
        INSERT INTO gym_members
            (id, gym_id, name, phone, email, date_of_birth, gender, address, emergency_contact)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(scope.gym_id())
    .bind(body.name.trim())
    .bind(body.phone.trim())
    .bind(&body.email)
    .bind(body.date_of_birth)
    .bind(&body.gender)
    .bind(&body.address)
    .bind(&body.emergency_contact)
    .fetch_one(&state.pool)
    .await?;

    tracing::info!(gym_id = %scope.gym_id(), member_id = %member.id, "Member added");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "member added", "member": member })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct UpdateMemberRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub emergency_contact: Option<String>,
    pub is_active: Option<bool>,
}

async fn update(
    State(state): State<AppState>,
    Extension(scope): Extension<TenantScope>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateMemberRequest>,
) -> ApiResult<impl IntoResponse> {
    let member: Option<MemberRow> = sqlx::query_as(
        r#"
        UPDATE gym_members SET
            name = COALESCE($3, name),
            phone = COALESCE($4, phone),
            email = COALESCE($5, email),
            date_of_birth = COALESCE($6, date_of_birth),
            gender = COALESCE($7, gender),
            address = COALESCE($8, address),
            emergency_contact = COALESCE($9, emergency_contact),
            is_active = COALESCE($10, is_active),
            updated_at = NOW()
        WHERE id = $1 AND gym_id = $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(scope.gym_id())
    .bind(&body.name)
    .bind(&body.phone)
    .bind(&body.email)
    .bind(body.date_of_birth)
    .bind(&body.gender)
    .bind(&body.address)
    .bind(&body.emergency_contact)
    .bind(body.is_active)
    .fetch_optional(&state.pool)
    .await?;

    let member = member.ok_or_else(|| ApiError::NotFound("member not found".to_string()))?;
    Ok(Json(json!({ "message": "updated", "member": member })))
}

async fn delete_one(
    State(state): State<AppState>,
    Extension(scope): Extension<TenantScope>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let rows = sqlx::query("DELETE FROM gym_members WHERE id = $1 AND gym_id = $2")
        .bind(id)
        .bind(scope.gym_id())
        .execute(&state.pool)
        .await?
        .rows_affected();

    if rows == 0 {
        return Err(ApiError::NotFound("member not found".to_string()));
    }
    Ok(Json(json!({ "message": "deleted" })))
}
