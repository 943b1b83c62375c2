//! Admin management of gym-manager (tenant) accounts

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use gymstack_shared::pagination::{PageInfo, PageQuery};

use crate::error::{ApiError, ApiResult};
use crate::routes::gym_auth::{GymManagerRow, GYM_MANAGER_COLUMNS};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/{id}", get(get_one).put(update).delete(delete_one))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub status: Option<String>,
}

async fn list(
    State(state): State<AppState>,
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

    let gym_managers: Vec<GymManagerRow> = sqlx::query_as(&format!(
        r#"
        SELECT {} FROM gym_managers
        WHERE ($1::TEXT IS NULL OR name ILIKE $1 OR email ILIKE $1 OR gym_name ILIKE $1)
          AND ($2::TEXT IS NULL OR subscription_status = $2)
        ORDER BY created_at DESC
        LIMIT $3 OFFSET $4
        "#,
        GYM_MANAGER_COLUMNS
    ))
    .bind(&search)
    .bind(&query.status)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(&state.pool)
    .await?;

    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM gym_managers
        WHERE ($1::TEXT IS NULL OR name ILIKE $1 OR email ILIKE $1 OR gym_name ILIKE $1)
          AND ($2::TEXT IS NULL OR subscription_status = $2)
        "#,
    )
    .bind(&search)
    .bind(&query.status)
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(json!({
        "gym_managers": gym_managers,
        "pagination": PageInfo::new(page, total),
    })))
}

async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<GymManagerRow>> {
    let row: Option<GymManagerRow> = sqlx::query_as(&format!(
        "SELECT {} FROM gym_managers WHERE id = $1",
        GYM_MANAGER_COLUMNS
    ))
    .bind(id)
    .fetch_optional(&state.pool)
    .await?;

    row.map(Json)
        .ok_or_else(|| ApiError::NotFound("gym manager not found".to_string()))
}

#[derive(Debug, Deserialize)]
pub struct UpdateGymRequest {
    pub name: Option<String>,
    pub gym_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub is_active: Option<bool>,
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateGymRequest>,
) -> ApiResult<impl IntoResponse> {
    let row: Option<GymManagerRow> = sqlx::query_as(&format!(
        r#"
        UPDATE gym_managers SET
            name = COALESCE($2, name),
            gym_name = COALESCE($3, gym_name),
            phone = COALESCE($4, phone),
            address = COALESCE($5, address),
            is_active = COALESCE($6, is_active),
            updated_at = NOW()
        WHERE id = $1
        RETURNING {}
        "#,
        GYM_MANAGER_COLUMNS
    ))
    .bind(id)
    .bind(&body.name)
    .bind(&body.gym_name)
    .bind(&body.phone)
    .bind(&body.address)
    .bind(body.is_active)
    .fetch_optional(&state.pool)
    .await?;

    let row = row.ok_or_else(|| ApiError::NotFound("gym manager not found".to_string()))?;
    Ok(Json(json!({ "message": "updated", "gym_manager": row })))
}

async fn delete_one(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let rows = sqlx::query("DELETE FROM gym_managers WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?
        .rows_affected();

    if rows == 0 {
        return Err(ApiError::NotFound("gym manager not found".to_string()));
    }

    tracing::info!(gym_id = %id, "Deleted gym manager account");
    Ok(Json(json!({ "message": "deleted" })))
}
