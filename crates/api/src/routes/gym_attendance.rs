//! Attendance check-in / check-out
//!
//! Check-in is gated by subscription validity, not the member-active flag
//! alone: the member needs at least one active, unexpired subscription.
//! Nothing prevents a second open record for the same member. Check-out
//! filters on `check_out IS NULL`, so a second checkout of the same record
//! is NotFound rather than an overwrite.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Extension, Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::FromRow;
use uuid::Uuid;

use gymstack_billing::TenantScope;
use gymstack_shared::pagination::{PageInfo, PageQuery};
use gymstack_shared::period::session_minutes;

use crate::auth::verify_tenant_access;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/checkin", post(check_in))
        .route("/{id}/checkout", put(check_out))
        .route("/member/{member_id}", get(member_history))
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AttendanceRow {
    pub id: Uuid,
    pub gym_id: Uuid,
    pub member_id: Uuid,
    pub check_in: DateTime<Utc>,
    pub check_out: Option<DateTime<Utc>>,
    pub duration_minutes: i32,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub member_id: Option<Uuid>,
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

    let attendance: Vec<AttendanceRow> = sqlx::query_as(
        r#"
        SELECT * FROM attendance
        WHERE gym_id = $1
          AND ($2::UUID IS NULL OR member_id = $2)
          AND ($3::TIMESTAMPTZ IS NULL OR check_in >= $3)
          AND ($4::TIMESTAMPTZ IS NULL OR check_in <= $4)
        ORDER BY check_in DESC
        LIMIT $5 OFFSET $6
        "#,
    )
    .bind(scope.gym_id())
    .bind(query.member_id)
    .bind(query.start_date)
    .bind(query.end_date)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(&state.pool)
    .await?;

    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM attendance
        WHERE gym_id = $1
          AND ($2::UUID IS NULL OR member_id = $2)
          AND ($3::TIMESTAMPTZ IS NULL OR check_in >= $3)
          AND ($4::TIMESTAMPTZ IS NULL OR check_in <= $4)
        "#,
    )
    .bind(scope.gym_id())
    .bind(query.member_id)
    .bind(query.start_date)
    .bind(query.end_date)
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(json!({
        "attendance": attendance,
        "pagination": PageInfo::new(page, total),
    })))
}

#[derive(Debug, Deserialize)]
pub struct CheckInRequest {
    pub member_id: Uuid,
    pub notes: Option<String>,
}

async fn check_in(
    State(state): State<AppState>,
    Extension(scope): Extension<TenantScope>,
    Json(body): Json<CheckInRequest>,
) -> ApiResult<impl IntoResponse> {
    let member: Option<(Uuid,)> = sqlx::query_as(
        "SELECT id FROM gym_members WHERE id = $1 AND gym_id = $2 AND is_active = TRUE",
    )
    .bind(body.member_id)
    .bind(scope.gym_id())
    .fetch_optional(&state.pool)
    .await?;
    if member.is_none() {
        return Err(ApiError::NotFound(
            "member not found or inactive".to_string(),
        ));
    }

    let has_active_subscription: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM member_subscriptions
            WHERE member_id = $1 AND gym_id = $2
              AND status = 'active' AND end_date >= NOW()
        )
        "#,
    )
    .bind(body.member_id)
    .bind(scope.gym_id())
    .fetch_one(&state.pool)
    .await?;

    if !has_active_subscription {
        return Err(ApiError::Forbidden(
            "member has no active subscription".to_string(),
        ));
    }

    let attendance: AttendanceRow = sqlx::query_as(
        r#"
        INSERT INTO attendance (id, gym_id, member_id, check_in, notes)
        VALUES ($1, $2, $3, NOW(), $4)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(scope.gym_id())
    .bind(body.member_id)
    .bind(&body.notes)
    .fetch_one(&state.pool)
    .await?;

    tracing::info!(
        gym_id = %scope.gym_id(),
        member_id = %body.member_id,
        attendance_id = %attendance.id,
        "Member checked in"
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "checked in", "attendance": attendance })),
    ))
}

async fn check_out(
    State(state): State<AppState>,
    Extension(scope): Extension<TenantScope>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let open: Option<AttendanceRow> = sqlx::query_as(
        "SELECT * FROM attendance WHERE id = $1 AND gym_id = $2 AND check_out IS NULL",
    )
    .bind(id)
    .bind(scope.gym_id())
    .fetch_optional(&state.pool)
    .await?;

    let open = open.ok_or_else(|| {
        ApiError::NotFound("attendance record not found or already checked out".to_string())
    })?;
    verify_tenant_access(open.gym_id, Some(scope))?;

    let check_out_time = Utc::now();
    let duration = session_minutes(open.check_in, check_out_time);

    // The NULL filter is repeated so a concurrent checkout of the same
    // record loses cleanly instead of overwriting.
    let attendance: Option<AttendanceRow> = sqlx::query_as(
        r#"
        UPDATE attendance SET
            check_out = $3,
            duration_minutes = $4,
            updated_at = NOW()
        WHERE id = $1 AND gym_id = $2 AND check_out IS NULL
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(scope.gym_id())
    .bind(check_out_time)
    .bind(duration)
    .fetch_optional(&state.pool)
    .await?;

    let attendance = attendance.ok_or_else(|| {
        ApiError::NotFound("attendance record not found or already checked out".to_string())
    })?;

    tracing::info!(
        gym_id = %scope.gym_id(),
        attendance_id = %id,
        duration_minutes = duration,
        "Member checked out"
    );

    Ok(Json(json!({
        "message": "checked out",
        "attendance": attendance,
    })))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

async fn member_history(
    State(state): State<AppState>,
    Extension(scope): Extension<TenantScope>,
    Path(member_id): Path<Uuid>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<impl IntoResponse> {
    let attendance: Vec<AttendanceRow> = sqlx::query_as(
        r#"
        SELECT * FROM attendance
        WHERE gym_id = $1 AND member_id = $2
          AND ($3::TIMESTAMPTZ IS NULL OR check_in >= $3)
          AND ($4::TIMESTAMPTZ IS NULL OR check_in <= $4)
        ORDER BY check_in DESC
        "#,
    )
    .bind(scope.gym_id())
    .bind(member_id)
    .bind(query.start_date)
    .bind(query.end_date)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(json!({ "attendance": attendance })))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]

    use super::*;

    // Needs a running Postgres with migrations applied; run with
    // `cargo test -- --ignored`.
    async fn setup_test_pool() -> sqlx::PgPool {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgresql://localhost/gymstack_test".to_string());
        sqlx::postgres::PgPoolOptions::new()
            .max_connections(2)
            .connect(&database_url)
            .await
            .expect("Failed to connect to test database")
    }

    #[tokio::test]
    #[ignore]
    async fn second_checkout_of_same_record_matches_no_rows() {
        let pool = setup_test_pool().await;
        let gym_id = Uuid::new_v4();
        let member_id = Uuid::new_v4();
        let attendance_id = Uuid::new_v4();

        sqlx::query(
            "INSERT INTO gym_managers (id, name, email, password_hash, gym_name)
             VALUES ($1, 'Owner', $2, 'TEST_HASH', 'Gym')",
        )
        .bind(gym_id)
        .bind(format!("owner-{}@example.com", gym_id))
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query("INSERT INTO gym_members (id, gym_id, name, phone) VALUES ($1, $2, 'M', '0')")
            .bind(member_id)
            .bind(gym_id)
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query(
            "INSERT INTO attendance (id, gym_id, member_id, check_in) VALUES ($1, $2, $3, NOW())",
        )
        .bind(attendance_id)
        .bind(gym_id)
        .bind(member_id)
        .execute(&pool)
        .await
        .unwrap();

        let close = || async {
            sqlx::query(
                "UPDATE attendance SET check_out = NOW(), duration_minutes = 1
                 WHERE id = $1 AND gym_id = $2 AND check_out IS NULL",
            )
            .bind(attendance_id)
            .bind(gym_id)
            .execute(&pool)
            .await
            .unwrap()
            .rows_affected()
        };

        assert_eq!(close().await, 1, "first checkout closes the record");
        assert_eq!(close().await, 0, "second checkout must not overwrite");

        sqlx::query("DELETE FROM gym_managers WHERE id = $1")
            .bind(gym_id)
            .execute(&pool)
            .await
            .ok();
    }
}
