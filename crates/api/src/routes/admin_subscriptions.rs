//! Admin management of platform subscriptions

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use gymstack_billing::{GymSubscription, GymSubscriptionPatch, NewGymSubscription, SubscriptionFilters};
use gymstack_shared::pagination::{PageInfo, PageQuery};

use crate::error::ApiResult;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_one).put(update).delete(cancel))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<String>,
    pub gym_manager_id: Option<Uuid>,
}

async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<impl IntoResponse> {
    let page = PageQuery {
        page: query.page,
        limit: query.limit,
    };
    let filters = SubscriptionFilters {
        status: query.status.filter(|s| !s.is_empty()),
        gym_id: query.gym_manager_id,
    };

    let (subscriptions, total) = state.subscriptions.list(filters, page).await?;
    Ok(Json(json!({
        "subscriptions": subscriptions,
        "pagination": PageInfo::new(page, total),
    })))
}

async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<GymSubscription>> {
    Ok(Json(state.subscriptions.get(id).await?))
}

async fn create(
    State(state): State<AppState>,
    Json(body): Json<NewGymSubscription>,
) -> ApiResult<impl IntoResponse> {
    let subscription = state.subscriptions.create(body).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "subscription created",
            "subscription": subscription,
        })),
    ))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<GymSubscriptionPatch>,
) -> ApiResult<impl IntoResponse> {
    let subscription = state.subscriptions.update(id, body).await?;
    Ok(Json(json!({
        "message": "updated",
        "subscription": subscription,
    })))
}

async fn cancel(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    state.subscriptions.cancel(id).await?;
    Ok(Json(json!({ "message": "subscription cancelled" })))
}
