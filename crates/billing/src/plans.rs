//! Platform subscription plan catalog (admin-owned)

use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use gymstack_shared::types::DurationUnit;

use crate::error::{BillingError, BillingResult};
use crate::models::SubscriptionPlan;

#[derive(Debug, Deserialize)]
pub struct NewPlan {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub duration: i32,
    #[serde(default = "default_duration_unit")]
    pub duration_unit: DurationUnit,
    #[serde(default)]
    pub features: Vec<String>,
    pub max_members: Option<i32>,
}

fn default_duration_unit() -> DurationUnit {
    DurationUnit::Months
}

#[derive(Debug, Default, Deserialize)]
pub struct PlanPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub duration: Option<i32>,
    pub duration_unit: Option<DurationUnit>,
    pub features: Option<Vec<String>>,
    pub max_members: Option<i32>,
    pub is_active: Option<bool>,
}

fn validate_terms(price: f64, duration: i32) -> BillingResult<()> {
    let mut errors = Vec::new();
    if price < 0.0 {
        errors.push("price must not be negative".to_string());
    }
    if duration < 1 {
        errors.push("duration must be at least 1".to_string());
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(BillingError::Validation(errors))
    }
}

#[derive(Clone)]
pub struct PlanService {
    pool: PgPool,
}

impl PlanService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List plans cheapest-first, optionally filtered by active flag.
    pub async fn list(&self, is_active: Option<bool>) -> BillingResult<Vec<SubscriptionPlan>> {
        let plans = sqlx::query_as::<_, SubscriptionPlan>(
            r#"
            SELECT * FROM subscription_plans
            WHERE ($1::BOOLEAN IS NULL OR is_active = $1)
            ORDER BY price ASC
            "#,
        )
        .bind(is_active)
        .fetch_all(&self.pool)
        .await?;

        Ok(plans)
    }

    pub async fn get(&self, id: Uuid) -> BillingResult<SubscriptionPlan> {
        sqlx::query_as::<_, SubscriptionPlan>("SELECT * FROM subscription_plans WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| BillingError::not_found("plan"))
    }

    /// Fetch a plan for the public surface: must exist AND be active.
    pub async fn get_active(&self, id: Uuid) -> BillingResult<SubscriptionPlan> {
        sqlx::query_as::<_, SubscriptionPlan>(
            "SELECT * FROM subscription_plans WHERE id = $1 AND is_active = TRUE",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| BillingError::NotFound("plan not found or inactive".to_string()))
    }

    pub async fn create(&self, new: NewPlan) -> BillingResult<SubscriptionPlan> {
        validate_terms(new.price, new.duration)?;

        let plan = sqlx::query_as::<_, SubscriptionPlan>(
            r#"
            INSERT INTO subscription_plans
                (id, name, description, price, duration, duration_unit, features, max_members)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.price)
        .bind(new.duration)
        .bind(new.duration_unit.as_str())
        .bind(&new.features)
        .bind(new.max_members.unwrap_or(-1))
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(plan_id = %plan.id, name = %plan.name, "Created platform plan");
        Ok(plan)
    }

    pub async fn update(&self, id: Uuid, patch: PlanPatch) -> BillingResult<SubscriptionPlan> {
        if patch.price.is_some() || patch.duration.is_some() {
            validate_terms(patch.price.unwrap_or(0.0), patch.duration.unwrap_or(1))?;
        }

        let plan = sqlx::query_as::<_, SubscriptionPlan>(
            r#"
            UPDATE subscription_plans SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                price = COALESCE($4, price),
                duration = COALESCE($5, duration),
                duration_unit = COALESCE($6, duration_unit),
                features = COALESCE($7, features),
                max_members = COALESCE($8, max_members),
                is_active = COALESCE($9, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&patch.name)
        .bind(&patch.description)
        .bind(patch.price)
        .bind(patch.duration)
        .bind(patch.duration_unit.map(|u| u.as_str()))
        .bind(&patch.features)
        .bind(patch.max_members)
        .bind(patch.is_active)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| BillingError::not_found("plan"))?;

        Ok(plan)
    }

    pub async fn delete(&self, id: Uuid) -> BillingResult<()> {
        let rows = sqlx::query("DELETE FROM subscription_plans WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows == 0 {
            return Err(BillingError::not_found("plan"));
        }

        tracing::info!(plan_id = %id, "Deleted platform plan");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_negative_price_and_zero_duration() {
        let err = validate_terms(-1.0, 0).unwrap_err();
        match err {
            BillingError::Validation(errors) => assert_eq!(errors.len(), 2),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn accepts_free_plan() {
        assert!(validate_terms(0.0, 1).is_ok());
    }
}
