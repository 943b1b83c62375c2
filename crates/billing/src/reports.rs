//! Report generation
//!
//! Reports are immutable point-in-time snapshots: generating the same
//! report twice inserts two rows, never updates one. The payload is a
//! tagged enum rather than a free-form blob, so each report type has one
//! concrete shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use gymstack_shared::types::ReportType;

use crate::error::{BillingError, BillingResult};
use crate::models::Report;
use crate::tenant::TenantScope;

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ReportPeriod {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct MethodTotal {
    pub payment_method: String,
    pub total: f64,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct KindTotal {
    pub kind: String,
    pub total: f64,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct MemberCheckIns {
    pub member_name: String,
    pub count: i64,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct DailyCheckIns {
    pub day: String,
    pub count: i64,
}

/// One concrete payload shape per report type.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportData {
    Revenue {
        total_revenue: f64,
        total_payments: i64,
        revenue_by_method: Vec<MethodTotal>,
        revenue_by_kind: Vec<KindTotal>,
    },
    Members {
        total_members: i64,
        active_members: i64,
        inactive_members: i64,
        total_subscriptions: i64,
        active_subscriptions: i64,
        expired_subscriptions: i64,
    },
    Attendance {
        total_check_ins: i64,
        attendance_by_member: Vec<MemberCheckIns>,
        daily_attendance: Vec<DailyCheckIns>,
    },
}

#[derive(Clone)]
pub struct ReportService {
    pool: PgPool,
}

impl ReportService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Tenant revenue report. Sums only the tenant's own pool — completed
    /// payments that are NOT platform `gym_manager_subscription` payments.
    pub async fn generate_revenue(
        &self,
        scope: TenantScope,
        period: ReportPeriod,
    ) -> BillingResult<(Report, ReportData)> {
        let total_revenue: Option<f64> = sqlx::query_scalar(
            r#"
            SELECT SUM(amount) FROM payments
            WHERE gym_id = $1 AND status = 'completed' AND kind <> 'gym_manager_subscription'
              AND ($2::TIMESTAMPTZ IS NULL OR created_at >= $2)
              AND ($3::TIMESTAMPTZ IS NULL OR created_at <= $3)
            "#,
        )
        .bind(scope.gym_id())
        .bind(period.start_date)
        .bind(period.end_date)
        .fetch_one(&self.pool)
        .await?;

        let total_payments: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM payments
            WHERE gym_id = $1 AND status = 'completed' AND kind <> 'gym_manager_subscription'
              AND ($2::TIMESTAMPTZ IS NULL OR created_at >= $2)
              AND ($3::TIMESTAMPTZ IS NULL OR created_at <= $3)
            "#,
        )
        .bind(scope.gym_id())
        .bind(period.start_date)
        .bind(period.end_date)
        .fetch_one(&self.pool)
        .await?;

        let revenue_by_method = sqlx::query_as::<_, MethodTotal>(
            r#"
            SELECT payment_method, COALESCE(SUM(amount), 0) AS total
            FROM payments
            WHERE gym_id = $1 AND status = 'completed' AND kind <> 'gym_manager_subscription'
              AND ($2::TIMESTAMPTZ IS NULL OR created_at >= $2)
              AND ($3::TIMESTAMPTZ IS NULL OR created_at <= $3)
            GROUP BY payment_method
            "#,
        )
        .bind(scope.gym_id())
        .bind(period.start_date)
        .bind(period.end_date)
        .fetch_all(&self.pool)
        .await?;

        let revenue_by_kind = sqlx::query_as::<_, KindTotal>(
            r#"
            SELECT kind, COALESCE(SUM(amount), 0) AS total
            FROM payments
            WHERE gym_id = $1 AND status = 'completed' AND kind <> 'gym_manager_subscription'
              AND ($2::TIMESTAMPTZ IS NULL OR created_at >= $2)
              AND ($3::TIMESTAMPTZ IS NULL OR created_at <= $3)
            GROUP BY kind
            "#,
        )
        .bind(scope.gym_id())
        .bind(period.start_date)
        .bind(period.end_date)
        .fetch_all(&self.pool)
        .await?;

        let data = ReportData::Revenue {
            total_revenue: total_revenue.unwrap_or(0.0),
            total_payments,
            revenue_by_method,
            revenue_by_kind,
        };

        let report = self
            .persist(scope, ReportType::Revenue, "Revenue report", &data, period)
            .await?;
        Ok((report, data))
    }

    pub async fn generate_members(&self, scope: TenantScope) -> BillingResult<(Report, ReportData)> {
        let total_members: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM gym_members WHERE gym_id = $1")
                .bind(scope.gym_id())
                .fetch_one(&self.pool)
                .await?;

        let active_members: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM gym_members WHERE gym_id = $1 AND is_active = TRUE",
        )
        .bind(scope.gym_id())
        .fetch_one(&self.pool)
        .await?;

        let total_subscriptions: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM member_subscriptions WHERE gym_id = $1")
                .bind(scope.gym_id())
                .fetch_one(&self.pool)
                .await?;

        let active_subscriptions: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM member_subscriptions
            WHERE gym_id = $1 AND status = 'active' AND end_date >= NOW()
            "#,
        )
        .bind(scope.gym_id())
        .fetch_one(&self.pool)
        .await?;

        let data = ReportData::Members {
            total_members,
            active_members,
            inactive_members: total_members - active_members,
            total_subscriptions,
            active_subscriptions,
            expired_subscriptions: total_subscriptions - active_subscriptions,
        };

        let report = self
            .persist(
                scope,
                ReportType::Members,
                "Members report",
                &data,
                ReportPeriod::default(),
            )
            .await?;
        Ok((report, data))
    }

    pub async fn generate_attendance(
        &self,
        scope: TenantScope,
        period: ReportPeriod,
    ) -> BillingResult<(Report, ReportData)> {
        let total_check_ins: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM attendance
            WHERE gym_id = $1
              AND ($2::TIMESTAMPTZ IS NULL OR check_in >= $2)
              AND ($3::TIMESTAMPTZ IS NULL OR check_in <= $3)
            "#,
        )
        .bind(scope.gym_id())
        .bind(period.start_date)
        .bind(period.end_date)
        .fetch_one(&self.pool)
        .await?;

        let attendance_by_member = sqlx::query_as::<_, MemberCheckIns>(
            r#"
            SELECT m.name AS member_name, COUNT(*) AS count
            FROM attendance a
            JOIN gym_members m ON m.id = a.member_id
            WHERE a.gym_id = $1
              AND ($2::TIMESTAMPTZ IS NULL OR a.check_in >= $2)
              AND ($3::TIMESTAMPTZ IS NULL OR a.check_in <= $3)
            GROUP BY m.id, m.name
            ORDER BY count DESC
            LIMIT 10
            "#,
        )
        .bind(scope.gym_id())
        .bind(period.start_date)
        .bind(period.end_date)
        .fetch_all(&self.pool)
        .await?;

        let daily_attendance = sqlx::query_as::<_, DailyCheckIns>(
            r#"
            SELECT TO_CHAR(check_in, 'YYYY-MM-DD') AS day, COUNT(*) AS count
            FROM attendance
            WHERE gym_id = $1
              AND ($2::TIMESTAMPTZ IS NULL OR check_in >= $2)
              AND ($3::TIMESTAMPTZ IS NULL OR check_in <= $3)
            GROUP BY 1
            ORDER BY 1
            "#,
        )
        .bind(scope.gym_id())
        .bind(period.start_date)
        .bind(period.end_date)
        .fetch_all(&self.pool)
        .await?;

        let data = ReportData::Attendance {
            total_check_ins,
            attendance_by_member,
            daily_attendance,
        };

        let report = self
            .persist(
                scope,
                ReportType::Attendance,
                "Attendance report",
                &data,
                period,
            )
            .await?;
        Ok((report, data))
    }

    /// Latest reports for the tenant, newest first, capped at 50.
    pub async fn list(
        &self,
        scope: TenantScope,
        report_type: Option<ReportType>,
    ) -> BillingResult<Vec<Report>> {
        let reports = sqlx::query_as::<_, Report>(
            r#"
            SELECT id, gym_id, report_type, title, data, period_start, period_end, generated_at
            FROM reports
            WHERE gym_id = $1
              AND ($2::TEXT IS NULL OR report_type = $2)
            ORDER BY generated_at DESC
            LIMIT 50
            "#,
        )
        .bind(scope.gym_id())
        .bind(report_type.map(|t| t.as_str()))
        .fetch_all(&self.pool)
        .await?;

        Ok(reports)
    }

    pub async fn get(&self, scope: TenantScope, id: Uuid) -> BillingResult<Report> {
        sqlx::query_as::<_, Report>(
            r#"
            SELECT id, gym_id, report_type, title, data, period_start, period_end, generated_at
            FROM reports
            WHERE id = $1 AND gym_id = $2
            "#,
        )
        .bind(id)
        .bind(scope.gym_id())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| BillingError::not_found("report"))
    }

    async fn persist(
        &self,
        scope: TenantScope,
        report_type: ReportType,
        title: &str,
        data: &ReportData,
        period: ReportPeriod,
    ) -> BillingResult<Report> {
        let payload = serde_json::to_value(data)
            .map_err(|e| BillingError::Internal(format!("failed to serialize report: {}", e)))?;

        let report = sqlx::query_as::<_, Report>(
            r#"
            INSERT INTO reports
                (id, gym_id, report_type, title, data, period_start, period_end)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, gym_id, report_type, title, data, period_start, period_end, generated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(scope.gym_id())
        .bind(report_type.as_str())
        .bind(title)
        .bind(payload)
        .bind(period.start_date)
        .bind(period.end_date)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(
            gym_id = %scope.gym_id(),
            report_id = %report.id,
            report_type = %report_type,
            "Generated report snapshot"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_data_is_tagged_by_kind() {
        let data = ReportData::Members {
            total_members: 10,
            active_members: 8,
            inactive_members: 2,
            total_subscriptions: 9,
            active_subscriptions: 7,
            expired_subscriptions: 2,
        };
        let value = serde_json::to_value(&data).unwrap();
        assert_eq!(value["kind"], "members");
        assert_eq!(value["active_members"], 8);
    }

    #[test]
    fn revenue_payload_round_trips() {
        let data = ReportData::Revenue {
            total_revenue: 150.0,
            total_payments: 3,
            revenue_by_method: vec![MethodTotal {
                payment_method: "cash".to_string(),
                total: 150.0,
            }],
            revenue_by_kind: vec![KindTotal {
                kind: "member_subscription".to_string(),
                total: 150.0,
            }],
        };
        let value = serde_json::to_value(&data).unwrap();
        let back: ReportData = serde_json::from_value(value).unwrap();
        match back {
            ReportData::Revenue { total_revenue, .. } => assert_eq!(total_revenue, 150.0),
            other => panic!("expected revenue payload, got {:?}", other),
        }
    }
}
