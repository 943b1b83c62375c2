//! Row types for the billing domain
//!
//! Status and method columns are TEXT in the schema and `String` here; the
//! canonical values live in `gymstack_shared::types`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Platform-level plan sold to gym managers. Admin-owned, no tenant key.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SubscriptionPlan {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub duration: i32,
    pub duration_unit: String,
    pub features: Vec<String>,
    pub max_members: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A gym manager's paid relationship to the platform.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct GymSubscription {
    pub id: Uuid,
    pub gym_id: Uuid,
    pub plan_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: String,
    pub payment_method: String,
    pub payment_gateway_id: Option<String>,
    pub amount: f64,
    pub auto_renew: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Tenant-owned plan catalog entry for gym members.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MemberPlan {
    pub id: Uuid,
    pub gym_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub duration: i32,
    pub duration_unit: String,
    pub features: Vec<String>,
    pub max_members: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A gym member's subscription. `plan_id` is NULL for manual entries, in
/// which case `plan_name`/`price` were supplied directly by the gym.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MemberSubscription {
    pub id: Uuid,
    pub gym_id: Uuid,
    pub member_id: Uuid,
    pub plan_id: Option<Uuid>,
    pub plan_name: String,
    pub price: f64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: String,
    pub payment_method: String,
    pub auto_renew: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A settled or pending payment. `kind` selects the revenue pool.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Payment {
    pub id: Uuid,
    pub gym_id: Uuid,
    pub kind: String,
    pub related_id: Uuid,
    pub amount: f64,
    pub currency: String,
    pub payment_method: String,
    pub payment_gateway_id: Option<String>,
    pub status: String,
    pub paid_at: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Persisted report snapshot. `data` is a serialized `ReportData`.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Report {
    pub id: Uuid,
    pub gym_id: Uuid,
    pub report_type: String,
    pub title: String,
    pub data: serde_json::Value,
    pub period_start: Option<DateTime<Utc>>,
    pub period_end: Option<DateTime<Utc>>,
    pub generated_at: DateTime<Utc>,
}
