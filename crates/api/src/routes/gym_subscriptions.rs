//! Tenant member-subscription lifecycle routes

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use gymstack_billing::{
    MemberSubscription, MemberSubscriptionFilters, MemberSubscriptionPatch, NewMemberSubscription,
    TenantScope,
};
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
    pub member_id: Option<Uuid>,
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
    let filters = MemberSubscriptionFilters {
        status: query.status.filter(|s| !s.is_empty()),
        member_id: query.member_id,
    };

    let (subscriptions, total) = state.member_subscriptions.list(scope, filters, page).await?;
    Ok(Json(json!({
        "subscriptions": subscriptions,
        "pagination": PageInfo::new(page, total),
    })))
}

async fn get_one(
    State(state): State<AppState>,
    Extension(scope): Extension<TenantScope>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MemberSubscription>> {
    Ok(Json(state.member_subscriptions.get(scope, id).await?))
}

async fn create(
    State(state): State<AppState>,
    Extension(scope): Extension<TenantScope>,
    Json(body): Json<NewMemberSubscription>,
) -> ApiResult<impl IntoResponse> {
    let subscription = state.member_subscriptions.create(scope, body).await?;
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
    Extension(scope): Extension<TenantScope>,
    Path(id): Path<Uuid>,
    Json(body): Json<MemberSubscriptionPatch>,
) -> ApiResult<impl IntoResponse> {
    let subscription = state.member_subscriptions.update(scope, id, body).await?;
    Ok(Json(json!({
        "message": "updated",
        "subscription": subscription,
    })))
}

async fn cancel(
    State(state): State<AppState>,
    Extension(scope): Extension<TenantScope>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    state.member_subscriptions.cancel(scope, id).await?;
    Ok(Json(json!({ "message": "subscription cancelled" })))
}
