//! Billing invariants
//!
//! Runnable consistency checks for the subscription and payment data.
//! Checks only read, never write; each violation carries enough context to
//! debug the offending rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::BillingResult;

/// Result of running a single invariant check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvariantViolation {
    /// Which invariant was violated
    pub invariant: String,
    /// Gym(s) affected
    pub gym_ids: Vec<Uuid>,
    /// Human-readable description of the violation
    pub description: String,
    /// Additional context for debugging
    pub context: serde_json::Value,
    /// Severity level
    pub severity: ViolationSeverity,
}

/// Severity of an invariant violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationSeverity {
    /// Critical - the platform may be gating tenants incorrectly
    Critical,
    /// High - data inconsistency that needs attention
    High,
    /// Medium - potential issue, should investigate
    Medium,
    /// Low - minor inconsistency, informational
    Low,
}

impl std::fmt::Display for ViolationSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViolationSeverity::Critical => write!(f, "CRITICAL"),
            ViolationSeverity::High => write!(f, "HIGH"),
            ViolationSeverity::Medium => write!(f, "MEDIUM"),
            ViolationSeverity::Low => write!(f, "LOW"),
        }
    }
}

/// Summary of all invariant checks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvariantCheckSummary {
    pub checked_at: DateTime<Utc>,
    pub checks_run: usize,
    pub checks_passed: usize,
    pub checks_failed: usize,
    pub violations: Vec<InvariantViolation>,
    pub healthy: bool,
}

#[derive(Debug, sqlx::FromRow)]
struct GymRow {
    gym_id: Uuid,
}

#[derive(Debug, sqlx::FromRow)]
struct BacklinkRow {
    gym_id: Uuid,
    current_subscription_id: Uuid,
}

pub struct BillingInvariants {
    pool: PgPool,
}

impl BillingInvariants {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run every check and summarize.
    pub async fn run_all(&self) -> BillingResult<InvariantCheckSummary> {
        let mut violations = Vec::new();
        let mut checks_run = 0;

        for result in [
            self.check_active_gyms_have_valid_subscription().await?,
            self.check_subscription_backlinks().await?,
            self.check_completed_payments_have_paid_at().await?,
            self.check_payment_related_ids().await?,
        ] {
            checks_run += 1;
            if let Some(violation) = result {
                violations.push(violation);
            }
        }

        let checks_failed = violations.len();
        Ok(InvariantCheckSummary {
            checked_at: Utc::now(),
            checks_run,
            checks_passed: checks_run - checks_failed,
            checks_failed,
            healthy: violations.is_empty(),
            violations,
        })
    }

    /// A gym marked `active` must hold an active, unexpired subscription.
    async fn check_active_gyms_have_valid_subscription(
        &self,
    ) -> BillingResult<Option<InvariantViolation>> {
        let rows: Vec<GymRow> = sqlx::query_as(
            r#"
            SELECT g.id AS gym_id
            FROM gym_managers g
            WHERE g.subscription_status = 'active'
              AND NOT EXISTS (
                  SELECT 1 FROM gym_subscriptions s
                  WHERE s.gym_id = g.id AND s.status = 'active' AND s.end_date >= NOW()
              )
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        if rows.is_empty() {
            return Ok(None);
        }

        let gym_ids: Vec<Uuid> = rows.into_iter().map(|r| r.gym_id).collect();
        Ok(Some(InvariantViolation {
            invariant: "active_gym_has_valid_subscription".to_string(),
            description: format!(
                "{} gym(s) marked active without an active unexpired subscription",
                gym_ids.len()
            ),
            context: serde_json::json!({ "count": gym_ids.len() }),
            severity: ViolationSeverity::Critical,
            gym_ids,
        }))
    }

    /// `current_subscription_id` must point at a subscription owned by the
    /// same gym.
    async fn check_subscription_backlinks(&self) -> BillingResult<Option<InvariantViolation>> {
        let rows: Vec<BacklinkRow> = sqlx::query_as(
            r#"
            SELECT g.id AS gym_id, g.current_subscription_id
            FROM gym_managers g
            WHERE g.current_subscription_id IS NOT NULL
              AND NOT EXISTS (
                  SELECT 1 FROM gym_subscriptions s
                  WHERE s.id = g.current_subscription_id AND s.gym_id = g.id
              )
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        if rows.is_empty() {
            return Ok(None);
        }

        let context = serde_json::json!({
            "dangling": rows
                .iter()
                .map(|r| r.current_subscription_id.to_string())
                .collect::<Vec<_>>(),
        });
        let gym_ids: Vec<Uuid> = rows.into_iter().map(|r| r.gym_id).collect();
        Ok(Some(InvariantViolation {
            invariant: "subscription_backlink_consistent".to_string(),
            description: format!("{} gym(s) reference a subscription they do not own", gym_ids.len()),
            context,
            severity: ViolationSeverity::High,
            gym_ids,
        }))
    }

    /// Completed payments must carry a settlement timestamp.
    async fn check_completed_payments_have_paid_at(
        &self,
    ) -> BillingResult<Option<InvariantViolation>> {
        let rows: Vec<GymRow> = sqlx::query_as(
            r#"
            SELECT DISTINCT gym_id
            FROM payments
            WHERE status = 'completed' AND paid_at IS NULL
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        if rows.is_empty() {
            return Ok(None);
        }

        let gym_ids: Vec<Uuid> = rows.into_iter().map(|r| r.gym_id).collect();
        Ok(Some(InvariantViolation {
            invariant: "completed_payment_has_paid_at".to_string(),
            description: "completed payments found without a paid_at timestamp".to_string(),
            context: serde_json::json!({ "gyms_affected": gym_ids.len() }),
            severity: ViolationSeverity::Medium,
            gym_ids,
        }))
    }

    /// Each payment's related_id must resolve in the table its kind names.
    /// Pool discipline depends on kind being trustworthy.
    async fn check_payment_related_ids(&self) -> BillingResult<Option<InvariantViolation>> {
        let rows: Vec<GymRow> = sqlx::query_as(
            r#"
            SELECT DISTINCT p.gym_id
            FROM payments p
            WHERE (p.kind = 'gym_manager_subscription'
                   AND NOT EXISTS (SELECT 1 FROM gym_subscriptions s WHERE s.id = p.related_id))
               OR (p.kind = 'member_subscription'
                   AND NOT EXISTS (SELECT 1 FROM member_subscriptions s WHERE s.id = p.related_id))
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        if rows.is_empty() {
            return Ok(None);
        }

        let gym_ids: Vec<Uuid> = rows.into_iter().map(|r| r.gym_id).collect();
        Ok(Some(InvariantViolation {
            invariant: "payment_related_id_resolves".to_string(),
            description: "payments whose related subscription is missing for their kind".to_string(),
            context: serde_json::json!({ "gyms_affected": gym_ids.len() }),
            severity: ViolationSeverity::High,
            gym_ids,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_displays_uppercase() {
        assert_eq!(ViolationSeverity::Critical.to_string(), "CRITICAL");
        assert_eq!(ViolationSeverity::Low.to_string(), "LOW");
    }
}
