//! Per-tenant member plan catalog

use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use gymstack_shared::types::DurationUnit;

use crate::error::{BillingError, BillingResult};
use crate::models::MemberPlan;
use crate::tenant::TenantScope;

#[derive(Debug, Deserialize)]
pub struct NewMemberPlan {
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
pub struct MemberPlanPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub duration: Option<i32>,
    pub duration_unit: Option<DurationUnit>,
    pub features: Option<Vec<String>>,
    pub max_members: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Clone)]
pub struct MemberPlanService {
    pool: PgPool,
}

impl MemberPlanService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        scope: TenantScope,
        is_active: Option<bool>,
    ) -> BillingResult<Vec<MemberPlan>> {
        let plans = sqlx::query_as::<_, MemberPlan>(
            r#"
            SELECT * FROM member_plans
            WHERE gym_id = $1
              AND ($2::BOOLEAN IS NULL OR is_active = $2)
            ORDER BY price ASC
            "#,
        )
        .bind(scope.gym_id())
        .bind(is_active)
        .fetch_all(&self.pool)
        .await?;

        Ok(plans)
    }

    pub async fn get(&self, scope: TenantScope, id: Uuid) -> BillingResult<MemberPlan> {
        sqlx::query_as::<_, MemberPlan>("SELECT * FROM member_plans WHERE id = $1 AND gym_id = $2")
            .bind(id)
            .bind(scope.gym_id())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| BillingError::not_found("plan"))
    }

    pub async fn create(
        &self,
        scope: TenantScope,
        new: NewMemberPlan,
    ) -> BillingResult<MemberPlan> {
        let mut errors = Vec::new();
        if new.price < 0.0 {
            errors.push("price must not be negative".to_string());
        }
        if new.duration < 1 {
            errors.push("duration must be at least 1".to_string());
        }
        if !errors.is_empty() {
            return Err(BillingError::Validation(errors));
        }

        let plan = sqlx::query_as::<_, MemberPlan>(
            r#"
            INSERT INTO member_plans
                (id, gym_id, name, description, price, duration, duration_unit, features, max_members)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(scope.gym_id())
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.price)
        .bind(new.duration)
        .bind(new.duration_unit.as_str())
        .bind(&new.features)
        .bind(new.max_members.unwrap_or(-1))
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(gym_id = %scope.gym_id(), plan_id = %plan.id, "Created member plan");
        Ok(plan)
    }

    pub async fn update(
        &self,
        scope: TenantScope,
        id: Uuid,
        patch: MemberPlanPatch,
    ) -> BillingResult<MemberPlan> {
        let plan = sqlx::query_as::<_, MemberPlan>(
            r#"
            UPDATE member_plans SET
                name = COALESCE($3, name),
                description = COALESCE($4, description),
                price = COALESCE($5, price),
                duration = COALESCE($6, duration),
                duration_unit = COALESCE($7, duration_unit),
                features = COALESCE($8, features),
                max_members = COALESCE($9, max_members),
                is_active = COALESCE($10, is_active),
                updated_at = NOW()
            WHERE id = $1 AND gym_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(scope.gym_id())
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

    pub async fn delete(&self, scope: TenantScope, id: Uuid) -> BillingResult<()> {
        let rows = sqlx::query("DELETE FROM member_plans WHERE id = $1 AND gym_id = $2")
            .bind(id)
            .bind(scope.gym_id())
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows == 0 {
            return Err(BillingError::not_found("plan"));
        }
        Ok(())
    }
}
