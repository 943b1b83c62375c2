//! Tenant member-plan catalog CRUD

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use gymstack_billing::{MemberPlan, MemberPlanPatch, NewMemberPlan, TenantScope};

use crate::error::ApiResult;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_one).put(update).delete(delete_one))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub is_active: Option<bool>,
}

async fn list(
    State(state): State<AppState>,
    Extension(scope): Extension<TenantScope>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<MemberPlan>>> {
    Ok(Json(state.member_plans.list(scope, query.is_active).await?))
}

async fn get_one(
    State(state): State<AppState>,
    Extension(scope): Extension<TenantScope>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MemberPlan>> {
    Ok(Json(state.member_plans.get(scope, id).await?))
}

async fn create(
    State(state): State<AppState>,
    Extension(scope): Extension<TenantScope>,
    Json(body): Json<NewMemberPlan>,
) -> ApiResult<impl IntoResponse> {
    let plan = state.member_plans.create(scope, body).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "plan created", "plan": plan })),
    ))
}

async fn update(
    State(state): State<AppState>,
    Extension(scope): Extension<TenantScope>,
    Path(id): Path<Uuid>,
    Json(body): Json<MemberPlanPatch>,
) -> ApiResult<impl IntoResponse> {
    let plan = state.member_plans.update(scope, id, body).await?;
    Ok(Json(json!({ "message": "updated", "plan": plan })))
}

async fn delete_one(
    State(state): State<AppState>,
    Extension(scope): Extension<TenantScope>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    state.member_plans.delete(scope, id).await?;
    Ok(Json(json!({ "message": "deleted" })))
}
