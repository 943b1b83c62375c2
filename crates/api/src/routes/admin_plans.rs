//! Admin CRUD over the platform plan catalog

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use gymstack_billing::{NewPlan, PlanPatch, SubscriptionPlan};

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
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<SubscriptionPlan>>> {
    Ok(Json(state.plans.list(query.is_active).await?))
}

async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SubscriptionPlan>> {
    Ok(Json(state.plans.get(id).await?))
}

async fn create(
    State(state): State<AppState>,
    Json(body): Json<NewPlan>,
) -> ApiResult<impl IntoResponse> {
    let plan = state.plans.create(body).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "plan created", "plan": plan })),
    ))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<PlanPatch>,
) -> ApiResult<impl IntoResponse> {
    let plan = state.plans.update(id, body).await?;
    Ok(Json(json!({ "message": "updated", "plan": plan })))
}

async fn delete_one(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    state.plans.delete(id).await?;
    Ok(Json(json!({ "message": "deleted" })))
}
