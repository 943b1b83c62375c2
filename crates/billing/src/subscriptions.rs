//! Platform subscription lifecycle
//!
//! A gym manager's paid relationship to the platform moves through
//! `active -> cancelled` (terminal) or `active -> expired` (worker sweep).
//! Creation, status patches, and cancellation each mirror the resulting
//! status onto the owning gym manager row inside the same transaction, so a
//! subscription and its gym can never disagree after a partial failure.
//! This component never sets `expired` itself.

use chrono::Utc;
use serde::Deserialize;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use gymstack_shared::pagination::PageQuery;
use gymstack_shared::period::advance_period;
use gymstack_shared::types::{DurationUnit, PaymentKind, PaymentStatus, PlatformPaymentMethod};

use crate::error::{BillingError, BillingResult};
use crate::models::{GymSubscription, SubscriptionPlan};

#[derive(Debug, Deserialize)]
pub struct NewGymSubscription {
    pub gym_id: Uuid,
    pub plan_id: Uuid,
    pub payment_method: PlatformPaymentMethod,
    pub payment_gateway_id: Option<String>,
    #[serde(default)]
    pub auto_renew: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct GymSubscriptionPatch {
    pub status: Option<String>,
    pub auto_renew: Option<bool>,
    pub payment_gateway_id: Option<String>,
}

#[derive(Debug, Default)]
pub struct SubscriptionFilters {
    pub status: Option<String>,
    pub gym_id: Option<Uuid>,
}

#[derive(Clone)]
pub struct SubscriptionService {
    pool: PgPool,
}

impl SubscriptionService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        filters: SubscriptionFilters,
        page: PageQuery,
    ) -> BillingResult<(Vec<GymSubscription>, i64)> {
        let subscriptions = sqlx::query_as::<_, GymSubscription>(
            r#"
            SELECT * FROM gym_subscriptions
            WHERE ($1::TEXT IS NULL OR status = $1)
              AND ($2::UUID IS NULL OR gym_id = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(&filters.status)
        .bind(filters.gym_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM gym_subscriptions
            WHERE ($1::TEXT IS NULL OR status = $1)
              AND ($2::UUID IS NULL OR gym_id = $2)
            "#,
        )
        .bind(&filters.status)
        .bind(filters.gym_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((subscriptions, total))
    }

    pub async fn get(&self, id: Uuid) -> BillingResult<GymSubscription> {
        sqlx::query_as::<_, GymSubscription>("SELECT * FROM gym_subscriptions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| BillingError::not_found("subscription"))
    }

    /// Admin-initiated creation. The plan does not need to be active on
    /// this path; the public self-service flow resolves an active-checked
    /// plan first and calls [`Self::create_for_plan`] directly.
    pub async fn create(&self, new: NewGymSubscription) -> BillingResult<GymSubscription> {
        let gym_exists: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM gym_managers WHERE id = $1")
                .bind(new.gym_id)
                .fetch_optional(&self.pool)
                .await?;
        if gym_exists.is_none() {
            return Err(BillingError::not_found("gym manager"));
        }

        let plan =
            sqlx::query_as::<_, SubscriptionPlan>("SELECT * FROM subscription_plans WHERE id = $1")
                .bind(new.plan_id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| BillingError::not_found("plan"))?;

        self.create_for_plan(new, &plan).await
    }

    /// Create a subscription against an already-resolved plan, writing the
    /// subscription, the gym status mirror, and the settling payment in one
    /// transaction.
    pub async fn create_for_plan(
        &self,
        new: NewGymSubscription,
        plan: &SubscriptionPlan,
    ) -> BillingResult<GymSubscription> {
        let unit = DurationUnit::parse(&plan.duration_unit).ok_or_else(|| {
            BillingError::Internal(format!("plan {} has invalid duration unit", plan.id))
        })?;

        let start_date = Utc::now();
        let end_date = advance_period(start_date, plan.duration.max(1) as u32, unit)
            .ok_or_else(|| BillingError::validation("plan duration is out of range"))?;

        let mut tx = self.pool.begin().await?;

        let subscription = sqlx::query_as::<_, GymSubscription>(
            r#"
            INSERT INTO gym_subscriptions
                (id, gym_id, plan_id, start_date, end_date, status,
                 payment_method, payment_gateway_id, amount, auto_renew)
            VALUES ($1, $2, $3, $4, $5, 'active', $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.gym_id)
        .bind(plan.id)
        .bind(start_date)
        .bind(end_date)
        .bind(new.payment_method.as_str())
        .bind(&new.payment_gateway_id)
        .bind(plan.price)
        .bind(new.auto_renew)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE gym_managers SET
                current_subscription_id = $1,
                subscription_status = 'active',
                updated_at = NOW()
            WHERE id = $2
            "#,
        )
        .bind(subscription.id)
        .bind(new.gym_id)
        .execute(&mut *tx)
        .await?;

        record_payment(
            &mut tx,
            new.gym_id,
            PaymentKind::GymSubscription,
            subscription.id,
            plan.price,
            new.payment_method.as_str(),
            new.payment_gateway_id.as_deref(),
            &format!("Subscription to the {} plan", plan.name),
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            gym_id = %new.gym_id,
            subscription_id = %subscription.id,
            plan = %plan.name,
            end_date = %end_date,
            "Created platform subscription"
        );

        Ok(subscription)
    }

    /// Patch subscription fields. A `status` patch is mirrored onto the
    /// gym manager in the same transaction.
    pub async fn update(
        &self,
        id: Uuid,
        patch: GymSubscriptionPatch,
    ) -> BillingResult<GymSubscription> {
        if let Some(status) = patch.status.as_deref() {
            const VALID: &[&str] = &["active", "expired", "cancelled"];
            if !VALID.contains(&status) {
                return Err(BillingError::validation(
                    "status must be one of active, expired, cancelled",
                ));
            }
        }

        let mut tx = self.pool.begin().await?;

        let subscription = sqlx::query_as::<_, GymSubscription>(
            r#"
            UPDATE gym_subscriptions SET
                status = COALESCE($2, status),
                auto_renew = COALESCE($3, auto_renew),
                payment_gateway_id = COALESCE($4, payment_gateway_id),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&patch.status)
        .bind(patch.auto_renew)
        .bind(&patch.payment_gateway_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| BillingError::not_found("subscription"))?;

        if let Some(status) = patch.status.as_deref() {
            sqlx::query(
                "UPDATE gym_managers SET subscription_status = $1, updated_at = NOW() WHERE id = $2",
            )
            .bind(status)
            .bind(subscription.gym_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!(subscription_id = %id, "Updated platform subscription");
        Ok(subscription)
    }

    /// Cancel a subscription. Terminal: there is no un-cancel.
    pub async fn cancel(&self, id: Uuid) -> BillingResult<GymSubscription> {
        let mut tx = self.pool.begin().await?;

        let subscription = sqlx::query_as::<_, GymSubscription>(
            r#"
            UPDATE gym_subscriptions SET status = 'cancelled', updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| BillingError::not_found("subscription"))?;

        sqlx::query(
            "UPDATE gym_managers SET subscription_status = 'cancelled', updated_at = NOW() WHERE id = $1",
        )
        .bind(subscription.gym_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            subscription_id = %id,
            gym_id = %subscription.gym_id,
            "Cancelled platform subscription"
        );
        Ok(subscription)
    }
}

/// Insert a completed payment row for a subscription-creation event.
#[allow(clippy::too_many_arguments)]
pub(crate) async fn record_payment(
    tx: &mut Transaction<'_, Postgres>,
    gym_id: Uuid,
    kind: PaymentKind,
    related_id: Uuid,
    amount: f64,
    payment_method: &str,
    payment_gateway_id: Option<&str>,
    description: &str,
) -> BillingResult<()> {
    sqlx::query(
        r#"
        INSERT INTO payments
            (id, gym_id, kind, related_id, amount, payment_method,
             payment_gateway_id, status, paid_at, description)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW(), $9)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(gym_id)
    .bind(kind.as_str())
    .bind(related_id)
    .bind(amount)
    .bind(payment_method)
    .bind(payment_gateway_id)
    .bind(PaymentStatus::Completed.as_str())
    .bind(description)
    .execute(&mut **tx)
    .await?;

    Ok(())
}
