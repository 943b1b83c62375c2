//! Tenant payment routes
//!
//! `total_amount` on the listing is tenant revenue only: completed
//! payments excluding the platform's `gym_manager_subscription` pool.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use gymstack_billing::{NewPayment, Payment, PaymentFilters, TenantScope};
use gymstack_shared::pagination::{PageInfo, PageQuery};

use crate::error::ApiResult;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_one).put(update))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub kind: Option<String>,
    pub status: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
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
    let filters = PaymentFilters {
        kind: query.kind.filter(|s| !s.is_empty()),
        status: query.status.filter(|s| !s.is_empty()),
        gym_id: None,
        start_date: query.start_date,
        end_date: query.end_date,
    };

    let (payments, total, total_amount) =
        state.payments.list_for_tenant(scope, filters, page).await?;
    Ok(Json(json!({
        "payments": payments,
        "pagination": PageInfo::new(page, total),
        "total_amount": total_amount,
    })))
}

async fn get_one(
    State(state): State<AppState>,
    Extension(scope): Extension<TenantScope>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Payment>> {
    Ok(Json(state.payments.get_for_tenant(scope, id).await?))
}

async fn create(
    State(state): State<AppState>,
    Extension(scope): Extension<TenantScope>,
    Json(body): Json<NewPayment>,
) -> ApiResult<impl IntoResponse> {
    let payment = state.payments.create_for_tenant(scope, body).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "payment recorded", "payment": payment })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct UpdatePaymentRequest {
    pub status: Option<String>,
    pub description: Option<String>,
}

async fn update(
    State(state): State<AppState>,
    Extension(scope): Extension<TenantScope>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdatePaymentRequest>,
) -> ApiResult<impl IntoResponse> {
    if let Some(status) = body.status.as_deref() {
        const VALID: &[&str] = &["pending", "completed", "failed", "refunded"];
        if !VALID.contains(&status) {
            return Err(crate::error::ApiError::validation(
                "status must be one of pending, completed, failed, refunded",
            ));
        }
    }

    let payment: Option<Payment> = sqlx::query_as(
        r#"
        UPDATE payments SET
            status = COALESCE($3, status),
            description = COALESCE($4, description),
            updated_at = NOW()
        WHERE id = $1 AND gym_id = $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(scope.gym_id())
    .bind(&body.status)
    .bind(&body.description)
    .fetch_optional(&state.pool)
    .await?;

    let payment =
        payment.ok_or_else(|| crate::error::ApiError::NotFound("payment not found".to_string()))?;
    Ok(Json(json!({ "message": "updated", "payment": payment })))
}
