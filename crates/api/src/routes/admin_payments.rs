//! Admin payment listing and platform revenue statistics
//!
//! All aggregates here are the platform pool (completed `gym_manager_subscription`
//! payments); tenant revenue never appears in these numbers.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use gymstack_billing::{Payment, PaymentFilters, RevenueStats};
use gymstack_shared::pagination::{PageInfo, PageQuery};

use crate::error::ApiResult;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/stats", get(revenue_stats))
        .route("/{id}", get(get_one))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub kind: Option<String>,
    pub status: Option<String>,
    pub gym_manager_id: Option<Uuid>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<impl IntoResponse> {
    let page = PageQuery {
        page: query.page,
        limit: query.limit,
    };
    let filters = PaymentFilters {
        kind: query.kind.filter(|s| !s.is_empty()),
        status: query.status.filter(|s| !s.is_empty()),
        gym_id: query.gym_manager_id,
        start_date: query.start_date,
        end_date: query.end_date,
    };

    let (payments, total, total_revenue) = state.payments.list_all(filters, page).await?;
    Ok(Json(json!({
        "payments": payments,
        "pagination": PageInfo::new(page, total),
        "total_revenue": total_revenue,
    })))
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

async fn revenue_stats(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> ApiResult<Json<RevenueStats>> {
    Ok(Json(
        state
            .payments
            .revenue_stats(query.start_date, query.end_date)
            .await?,
    ))
}

async fn get_one(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Json<Payment>> {
    Ok(Json(state.payments.get(id).await?))
}
