//! Payment records and revenue aggregation
//!
//! Two disjoint revenue pools share the payments table, discriminated by
//! `kind`. Platform revenue sums completed `gym_manager_subscription` payments;
//! tenant revenue sums completed `member_subscription` payments for one
//! gym. No aggregate in this module sums across the two.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use gymstack_shared::pagination::PageQuery;
use gymstack_shared::types::{PaymentKind, PaymentStatus};

use crate::error::{BillingError, BillingResult};
use crate::models::Payment;
use crate::tenant::TenantScope;

#[derive(Debug, Default, Deserialize)]
pub struct PaymentFilters {
    pub kind: Option<String>,
    pub status: Option<String>,
    pub gym_id: Option<Uuid>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct NewPayment {
    pub kind: PaymentKind,
    pub related_id: Uuid,
    pub amount: f64,
    pub payment_method: String,
    pub payment_gateway_id: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, FromRow)]
pub struct MethodRevenue {
    pub payment_method: String,
    pub total: f64,
    pub count: i64,
}

#[derive(Debug, Serialize, FromRow)]
pub struct MonthlyRevenue {
    pub year: i32,
    pub month: i32,
    pub total: f64,
    pub count: i64,
}

/// Platform revenue statistics (admin surface).
#[derive(Debug, Serialize)]
pub struct RevenueStats {
    pub total_revenue: f64,
    pub revenue_by_method: Vec<MethodRevenue>,
    pub revenue_by_month: Vec<MonthlyRevenue>,
    pub total_payments: i64,
}

#[derive(Clone)]
pub struct PaymentService {
    pool: PgPool,
}

impl PaymentService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Tenant payment listing. `total_amount` is the tenant revenue pool:
    /// completed payments excluding `gym_manager_subscription` (those belong to the
    /// platform even though they carry the tenant's gym_id).
    pub async fn list_for_tenant(
        &self,
        scope: TenantScope,
        filters: PaymentFilters,
        page: PageQuery,
    ) -> BillingResult<(Vec<Payment>, i64, f64)> {
        let payments = sqlx::query_as::<_, Payment>(
            r#"
            SELECT * FROM payments
            WHERE gym_id = $1
              AND ($2::TEXT IS NULL OR kind = $2)
              AND ($3::TEXT IS NULL OR status = $3)
              AND ($4::TIMESTAMPTZ IS NULL OR created_at >= $4)
              AND ($5::TIMESTAMPTZ IS NULL OR created_at <= $5)
            ORDER BY created_at DESC
            LIMIT $6 OFFSET $7
            "#,
        )
        .bind(scope.gym_id())
        .bind(&filters.kind)
        .bind(&filters.status)
        .bind(filters.start_date)
        .bind(filters.end_date)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM payments
            WHERE gym_id = $1
              AND ($2::TEXT IS NULL OR kind = $2)
              AND ($3::TEXT IS NULL OR status = $3)
              AND ($4::TIMESTAMPTZ IS NULL OR created_at >= $4)
              AND ($5::TIMESTAMPTZ IS NULL OR created_at <= $5)
            "#,
        )
        .bind(scope.gym_id())
        .bind(&filters.kind)
        .bind(&filters.status)
        .bind(filters.start_date)
        .bind(filters.end_date)
        .fetch_one(&self.pool)
        .await?;

        let total_amount: Option<f64> = sqlx::query_scalar(
            r#"
            SELECT SUM(amount) FROM payments
            WHERE gym_id = $1
              AND status = 'completed'
              AND kind <> 'gym_manager_subscription'
              AND ($2::TIMESTAMPTZ IS NULL OR created_at >= $2)
              AND ($3::TIMESTAMPTZ IS NULL OR created_at <= $3)
            "#,
        )
        .bind(scope.gym_id())
        .bind(filters.start_date)
        .bind(filters.end_date)
        .fetch_one(&self.pool)
        .await?;

        Ok((payments, total, total_amount.unwrap_or(0.0)))
    }

    pub async fn get_for_tenant(&self, scope: TenantScope, id: Uuid) -> BillingResult<Payment> {
        sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE id = $1 AND gym_id = $2")
            .bind(id)
            .bind(scope.gym_id())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| BillingError::not_found("payment"))
    }

    /// Manually record a tenant payment (e.g. cash taken at the desk).
    /// Recorded as already settled.
    pub async fn create_for_tenant(
        &self,
        scope: TenantScope,
        new: NewPayment,
    ) -> BillingResult<Payment> {
        if new.amount < 0.0 {
            return Err(BillingError::validation("amount must not be negative"));
        }

        if new.kind == PaymentKind::MemberSubscription {
            let exists: Option<(Uuid,)> = sqlx::query_as(
                "SELECT id FROM member_subscriptions WHERE id = $1 AND gym_id = $2",
            )
            .bind(new.related_id)
            .bind(scope.gym_id())
            .fetch_optional(&self.pool)
            .await?;
            if exists.is_none() {
                return Err(BillingError::not_found("subscription"));
            }
        }

        let payment = sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments
                (id, gym_id, kind, related_id, amount, payment_method,
                 payment_gateway_id, status, paid_at, description)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW(), $9)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(scope.gym_id())
        .bind(new.kind.as_str())
        .bind(new.related_id)
        .bind(new.amount)
        .bind(&new.payment_method)
        .bind(&new.payment_gateway_id)
        .bind(PaymentStatus::Completed.as_str())
        .bind(&new.description)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(
            gym_id = %scope.gym_id(),
            payment_id = %payment.id,
            amount = payment.amount,
            "Recorded tenant payment"
        );
        Ok(payment)
    }

    /// Admin payment listing across all tenants. `total_revenue` is the
    /// platform pool: completed `gym_manager_subscription` payments only.
    pub async fn list_all(
        &self,
        filters: PaymentFilters,
        page: PageQuery,
    ) -> BillingResult<(Vec<Payment>, i64, f64)> {
        let payments = sqlx::query_as::<_, Payment>(
            r#"
            SELECT * FROM payments
            WHERE ($1::TEXT IS NULL OR kind = $1)
              AND ($2::TEXT IS NULL OR status = $2)
              AND ($3::UUID IS NULL OR gym_id = $3)
              AND ($4::TIMESTAMPTZ IS NULL OR created_at >= $4)
              AND ($5::TIMESTAMPTZ IS NULL OR created_at <= $5)
            ORDER BY created_at DESC
            LIMIT $6 OFFSET $7
            "#,
        )
        .bind(&filters.kind)
        .bind(&filters.status)
        .bind(filters.gym_id)
        .bind(filters.start_date)
        .bind(filters.end_date)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM payments
            WHERE ($1::TEXT IS NULL OR kind = $1)
              AND ($2::TEXT IS NULL OR status = $2)
              AND ($3::UUID IS NULL OR gym_id = $3)
              AND ($4::TIMESTAMPTZ IS NULL OR created_at >= $4)
              AND ($5::TIMESTAMPTZ IS NULL OR created_at <= $5)
            "#,
        )
        .bind(&filters.kind)
        .bind(&filters.status)
        .bind(filters.gym_id)
        .bind(filters.start_date)
        .bind(filters.end_date)
        .fetch_one(&self.pool)
        .await?;

        let total_revenue: Option<f64> = sqlx::query_scalar(
            r#"
            SELECT SUM(amount) FROM payments
            WHERE kind = 'gym_manager_subscription'
              AND status = 'completed'
              AND ($1::UUID IS NULL OR gym_id = $1)
              AND ($2::TIMESTAMPTZ IS NULL OR created_at >= $2)
              AND ($3::TIMESTAMPTZ IS NULL OR created_at <= $3)
            "#,
        )
        .bind(filters.gym_id)
        .bind(filters.start_date)
        .bind(filters.end_date)
        .fetch_one(&self.pool)
        .await?;

        Ok((payments, total, total_revenue.unwrap_or(0.0)))
    }

    pub async fn get(&self, id: Uuid) -> BillingResult<Payment> {
        sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| BillingError::not_found("payment"))
    }

    /// Platform revenue statistics: completed `gym_manager_subscription` payments
    /// only, optionally constrained to a period.
    pub async fn revenue_stats(
        &self,
        start_date: Option<DateTime<Utc>>,
        end_date: Option<DateTime<Utc>>,
    ) -> BillingResult<RevenueStats> {
        let total_revenue: Option<f64> = sqlx::query_scalar(
            r#"
            SELECT SUM(amount) FROM payments
            WHERE kind = 'gym_manager_subscription' AND status = 'completed'
              AND ($1::TIMESTAMPTZ IS NULL OR created_at >= $1)
              AND ($2::TIMESTAMPTZ IS NULL OR created_at <= $2)
            "#,
        )
        .bind(start_date)
        .bind(end_date)
        .fetch_one(&self.pool)
        .await?;

        let revenue_by_method = sqlx::query_as::<_, MethodRevenue>(
            r#"
            SELECT payment_method, COALESCE(SUM(amount), 0) AS total, COUNT(*) AS count
            FROM payments
            WHERE kind = 'gym_manager_subscription' AND status = 'completed'
              AND ($1::TIMESTAMPTZ IS NULL OR created_at >= $1)
              AND ($2::TIMESTAMPTZ IS NULL OR created_at <= $2)
            GROUP BY payment_method
            "#,
        )
        .bind(start_date)
        .bind(end_date)
        .fetch_all(&self.pool)
        .await?;

        let revenue_by_month = sqlx::query_as::<_, MonthlyRevenue>(
            r#"
            SELECT EXTRACT(YEAR FROM created_at)::INT AS year,
                   EXTRACT(MONTH FROM created_at)::INT AS month,
                   COALESCE(SUM(amount), 0) AS total,
                   COUNT(*) AS count
            FROM payments
            WHERE kind = 'gym_manager_subscription' AND status = 'completed'
              AND ($1::TIMESTAMPTZ IS NULL OR created_at >= $1)
              AND ($2::TIMESTAMPTZ IS NULL OR created_at <= $2)
            GROUP BY 1, 2
            ORDER BY 1 DESC, 2 DESC
            "#,
        )
        .bind(start_date)
        .bind(end_date)
        .fetch_all(&self.pool)
        .await?;

        let total_payments: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM payments
            WHERE kind = 'gym_manager_subscription' AND status = 'completed'
              AND ($1::TIMESTAMPTZ IS NULL OR created_at >= $1)
              AND ($2::TIMESTAMPTZ IS NULL OR created_at <= $2)
            "#,
        )
        .bind(start_date)
        .bind(end_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(RevenueStats {
            total_revenue: total_revenue.unwrap_or(0.0),
            revenue_by_method,
            revenue_by_month,
            total_payments,
        })
    }
}
