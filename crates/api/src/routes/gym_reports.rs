//! Tenant report generation and retrieval
//!
//! Generation always inserts a new snapshot; prior reports are never
//! updated.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use gymstack_billing::{Report, ReportPeriod, TenantScope};
use gymstack_shared::types::ReportType;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/revenue", get(generate_revenue))
        .route("/members", get(generate_members))
        .route("/attendance", get(generate_attendance))
        .route("/{id}", get(get_one))
}

#[derive(Debug, Deserialize)]
pub struct PeriodQuery {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl PeriodQuery {
    fn period(&self) -> ReportPeriod {
        ReportPeriod {
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

async fn generate_revenue(
    State(state): State<AppState>,
    Extension(scope): Extension<TenantScope>,
    Query(query): Query<PeriodQuery>,
) -> ApiResult<impl IntoResponse> {
    let (report, data) = state.reports.generate_revenue(scope, query.period()).await?;
    Ok(Json(json!({ "report": report, "data": data })))
}

async fn generate_members(
    State(state): State<AppState>,
    Extension(scope): Extension<TenantScope>,
) -> ApiResult<impl IntoResponse> {
    let (report, data) = state.reports.generate_members(scope).await?;
    Ok(Json(json!({ "report": report, "data": data })))
}

async fn generate_attendance(
    State(state): State<AppState>,
    Extension(scope): Extension<TenantScope>,
    Query(query): Query<PeriodQuery>,
) -> ApiResult<impl IntoResponse> {
    let (report, data) = state
        .reports
        .generate_attendance(scope, query.period())
        .await?;
    Ok(Json(json!({ "report": report, "data": data })))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(rename = "type")]
    pub report_type: Option<String>,
}

async fn list(
    State(state): State<AppState>,
    Extension(scope): Extension<TenantScope>,
    Query(query): Query<ListQuery>,
) -> ApiResult<impl IntoResponse> {
    let report_type = match query.report_type.as_deref() {
        None | Some("") => None,
        Some(s) => Some(
            ReportType::parse(s)
                .ok_or_else(|| ApiError::validation("unknown report type"))?,
        ),
    };

    let reports = state.reports.list(scope, report_type).await?;
    Ok(Json(json!({ "reports": reports })))
}

async fn get_one(
    State(state): State<AppState>,
    Extension(scope): Extension<TenantScope>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Report>> {
    Ok(Json(state.reports.get(scope, id).await?))
}
