//! Member subscription lifecycle (tenant-scoped)
//!
//! Plan resolution is dual-mode: either a catalog `plan_id` (must belong to
//! the tenant and be active) or a manual triple of name/price/duration.
//! Manual entries always bill in months — `duration: 7` with no plan is
//! seven months, not seven days. Cancellation has no gym-level side effect,
//! unlike the platform lifecycle.

use chrono::Utc;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use gymstack_shared::pagination::PageQuery;
use gymstack_shared::period::advance_period;
use gymstack_shared::types::{DurationUnit, MemberPaymentMethod, PaymentKind};

use crate::error::{BillingError, BillingResult};
use crate::models::{MemberPlan, MemberSubscription};
use crate::subscriptions::record_payment;
use crate::tenant::TenantScope;

#[derive(Debug, Deserialize)]
pub struct NewMemberSubscription {
    pub member_id: Uuid,
    pub plan_id: Option<Uuid>,
    pub plan_name: Option<String>,
    pub price: Option<f64>,
    pub duration: Option<i32>,
    #[serde(default)]
    pub payment_method: MemberPaymentMethod,
    #[serde(default)]
    pub auto_renew: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct MemberSubscriptionPatch {
    pub status: Option<String>,
    pub auto_renew: Option<bool>,
}

#[derive(Debug, Default)]
pub struct MemberSubscriptionFilters {
    pub status: Option<String>,
    pub member_id: Option<Uuid>,
}

/// Resolved billing terms for a new member subscription.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanTerms {
    pub plan_id: Option<Uuid>,
    pub plan_name: String,
    pub price: f64,
    pub duration: u32,
    pub duration_unit: DurationUnit,
}

impl PlanTerms {
    /// Terms from a catalog plan: price/duration/unit verbatim. An
    /// unparseable unit falls back to months, matching the end-date rule.
    pub fn from_plan(plan: &MemberPlan) -> Self {
        Self {
            plan_id: Some(plan.id),
            plan_name: plan.name.clone(),
            price: plan.price,
            duration: plan.duration.max(1) as u32,
            duration_unit: DurationUnit::parse(&plan.duration_unit)
                .unwrap_or(DurationUnit::Months),
        }
    }

    /// Terms from manual entry. All three fields are required; the unit is
    /// always months.
    pub fn from_manual(
        plan_name: Option<&str>,
        price: Option<f64>,
        duration: Option<i32>,
    ) -> BillingResult<Self> {
        let mut errors = Vec::new();
        if plan_name.map_or(true, |n| n.trim().is_empty()) {
            errors.push("plan_name is required when no plan_id is given".to_string());
        }
        match price {
            None => errors.push("price is required when no plan_id is given".to_string()),
            Some(p) if p < 0.0 => errors.push("price must not be negative".to_string()),
            _ => {}
        }
        match duration {
            None => errors.push("duration is required when no plan_id is given".to_string()),
            Some(d) if d < 1 => errors.push("duration must be at least 1".to_string()),
            _ => {}
        }
        if !errors.is_empty() {
            return Err(BillingError::Validation(errors));
        }

        Ok(Self {
            plan_id: None,
            plan_name: plan_name.unwrap_or_default().trim().to_string(),
            price: price.unwrap_or_default(),
            duration: duration.unwrap_or(1) as u32,
            duration_unit: DurationUnit::Months,
        })
    }
}

#[derive(Clone)]
pub struct MemberSubscriptionService {
    pool: PgPool,
}

impl MemberSubscriptionService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        scope: TenantScope,
        filters: MemberSubscriptionFilters,
        page: PageQuery,
    ) -> BillingResult<(Vec<MemberSubscription>, i64)> {
        let subscriptions = sqlx::query_as::<_, MemberSubscription>(
            r#"
            SELECT * FROM member_subscriptions
            WHERE gym_id = $1
              AND ($2::TEXT IS NULL OR status = $2)
              AND ($3::UUID IS NULL OR member_id = $3)
            ORDER BY created_at DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(scope.gym_id())
        .bind(&filters.status)
        .bind(filters.member_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM member_subscriptions
            WHERE gym_id = $1
              AND ($2::TEXT IS NULL OR status = $2)
              AND ($3::UUID IS NULL OR member_id = $3)
            "#,
        )
        .bind(scope.gym_id())
        .bind(&filters.status)
        .bind(filters.member_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((subscriptions, total))
    }

    pub async fn get(&self, scope: TenantScope, id: Uuid) -> BillingResult<MemberSubscription> {
        sqlx::query_as::<_, MemberSubscription>(
            "SELECT * FROM member_subscriptions WHERE id = $1 AND gym_id = $2",
        )
        .bind(id)
        .bind(scope.gym_id())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| BillingError::not_found("subscription"))
    }

    pub async fn create(
        &self,
        scope: TenantScope,
        new: NewMemberSubscription,
    ) -> BillingResult<MemberSubscription> {
        let member_exists: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM gym_members WHERE id = $1 AND gym_id = $2")
                .bind(new.member_id)
                .bind(scope.gym_id())
                .fetch_optional(&self.pool)
                .await?;
        if member_exists.is_none() {
            return Err(BillingError::not_found("member"));
        }

        let terms = match new.plan_id {
            Some(plan_id) => {
                let plan = sqlx::query_as::<_, MemberPlan>(
                    "SELECT * FROM member_plans WHERE id = $1 AND gym_id = $2 AND is_active = TRUE",
                )
                .bind(plan_id)
                .bind(scope.gym_id())
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| BillingError::NotFound("plan not found or inactive".to_string()))?;

                PlanTerms::from_plan(&plan)
            }
            None => PlanTerms::from_manual(new.plan_name.as_deref(), new.price, new.duration)?,
        };

        let start_date = Utc::now();
        let end_date = advance_period(start_date, terms.duration, terms.duration_unit)
            .ok_or_else(|| BillingError::validation("duration is out of range"))?;

        let mut tx = self.pool.begin().await?;

        let subscription = sqlx::query_as::<_, MemberSubscription>(
            r#"
            INSERT INTO member_subscriptions
                (id, gym_id, member_id, plan_id, plan_name, price,
                 start_date, end_date, status, payment_method, auto_renew)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'active', $9, $10)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(scope.gym_id())
        .bind(new.member_id)
        .bind(terms.plan_id)
        .bind(&terms.plan_name)
        .bind(terms.price)
        .bind(start_date)
        .bind(end_date)
        .bind(new.payment_method.as_str())
        .bind(new.auto_renew)
        .fetch_one(&mut *tx)
        .await?;

        record_payment(
            &mut tx,
            scope.gym_id(),
            PaymentKind::MemberSubscription,
            subscription.id,
            terms.price,
            new.payment_method.as_str(),
            None,
            &format!("Member subscription to the {} plan", terms.plan_name),
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            gym_id = %scope.gym_id(),
            member_id = %new.member_id,
            subscription_id = %subscription.id,
            plan = %terms.plan_name,
            end_date = %end_date,
            "Created member subscription"
        );

        Ok(subscription)
    }

    pub async fn update(
        &self,
        scope: TenantScope,
        id: Uuid,
        patch: MemberSubscriptionPatch,
    ) -> BillingResult<MemberSubscription> {
        if let Some(status) = patch.status.as_deref() {
            const VALID: &[&str] = &["active", "expired", "cancelled", "suspended"];
            if !VALID.contains(&status) {
                return Err(BillingError::validation(
                    "status must be one of active, expired, cancelled, suspended",
                ));
            }
        }

        sqlx::query_as::<_, MemberSubscription>(
            r#"
            UPDATE member_subscriptions SET
                status = COALESCE($3, status),
                auto_renew = COALESCE($4, auto_renew),
                updated_at = NOW()
            WHERE id = $1 AND gym_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(scope.gym_id())
        .bind(&patch.status)
        .bind(patch.auto_renew)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| BillingError::not_found("subscription"))
    }

    /// Cancel within the tenant. No aggregate status to mirror here.
    pub async fn cancel(&self, scope: TenantScope, id: Uuid) -> BillingResult<MemberSubscription> {
        let subscription = sqlx::query_as::<_, MemberSubscription>(
            r#"
            UPDATE member_subscriptions SET status = 'cancelled', updated_at = NOW()
            WHERE id = $1 AND gym_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(scope.gym_id())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| BillingError::not_found("subscription"))?;

        tracing::info!(
            gym_id = %scope.gym_id(),
            subscription_id = %id,
            "Cancelled member subscription"
        );
        Ok(subscription)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc as UtcTz};

    fn plan_with_unit(unit: &str, duration: i32) -> MemberPlan {
        let now: DateTime<chrono::Utc> = UtcTz.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        MemberPlan {
            id: Uuid::new_v4(),
            gym_id: Uuid::new_v4(),
            name: "Gold".to_string(),
            description: None,
            price: 200.0,
            duration,
            duration_unit: unit.to_string(),
            features: vec![],
            max_members: -1,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn catalog_terms_use_plan_unit_verbatim() {
        let terms = PlanTerms::from_plan(&plan_with_unit("days", 14));
        assert_eq!(terms.duration_unit, DurationUnit::Days);
        assert_eq!(terms.duration, 14);
        assert_eq!(terms.price, 200.0);
    }

    #[test]
    fn manual_terms_always_bill_in_months() {
        // duration 7 with no plan means seven MONTHS, not seven days.
        let terms = PlanTerms::from_manual(Some("Trial"), Some(50.0), Some(7)).unwrap();
        assert_eq!(terms.duration_unit, DurationUnit::Months);
        assert_eq!(terms.duration, 7);
        assert!(terms.plan_id.is_none());
    }

    #[test]
    fn manual_terms_require_the_full_triple() {
        let err = PlanTerms::from_manual(None, None, None).unwrap_err();
        match err {
            BillingError::Validation(errors) => {
                assert_eq!(errors.len(), 3, "one message per missing field: {:?}", errors)
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn manual_terms_reject_blank_name_and_bad_values() {
        let err = PlanTerms::from_manual(Some("  "), Some(-5.0), Some(0)).unwrap_err();
        match err {
            BillingError::Validation(errors) => assert_eq!(errors.len(), 3),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn unknown_catalog_unit_falls_back_to_months() {
        let terms = PlanTerms::from_plan(&plan_with_unit("weeks", 2));
        assert_eq!(terms.duration_unit, DurationUnit::Months);
    }
}
