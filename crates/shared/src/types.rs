//! Domain enums shared between the API and billing crates
//!
//! Database columns for these are plain TEXT with CHECK constraints; rows
//! are read as `String` and bound with `as_str()`. The enums exist for the
//! serde boundary and for exhaustive matching in application code.

use serde::{Deserialize, Serialize};

/// The two principal kinds a token can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrincipalKind {
    Admin,
    GymManager,
}

impl PrincipalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrincipalKind::Admin => "admin",
            PrincipalKind::GymManager => "gym_manager",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(PrincipalKind::Admin),
            "gym_manager" => Some(PrincipalKind::GymManager),
            _ => None,
        }
    }
}

impl std::fmt::Display for PrincipalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Aggregate subscription status carried on a gym manager account.
///
/// This is the single source of truth consulted by the auth middleware:
/// anything other than `active` blocks tenant operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GymSubscriptionStatus {
    Active,
    Expired,
    Suspended,
    Cancelled,
}

impl GymSubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GymSubscriptionStatus::Active => "active",
            GymSubscriptionStatus::Expired => "expired",
            GymSubscriptionStatus::Suspended => "suspended",
            GymSubscriptionStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(GymSubscriptionStatus::Active),
            "expired" => Some(GymSubscriptionStatus::Expired),
            "suspended" => Some(GymSubscriptionStatus::Suspended),
            "cancelled" => Some(GymSubscriptionStatus::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for GymSubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status of an individual member subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberSubscriptionStatus {
    Active,
    Expired,
    Cancelled,
    Suspended,
}

impl MemberSubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberSubscriptionStatus::Active => "active",
            MemberSubscriptionStatus::Expired => "expired",
            MemberSubscriptionStatus::Cancelled => "cancelled",
            MemberSubscriptionStatus::Suspended => "suspended",
        }
    }
}

impl std::fmt::Display for MemberSubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Plan duration unit. Manual member-subscription entry has no plan and
/// always bills in months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationUnit {
    Days,
    Months,
    Years,
}

impl DurationUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            DurationUnit::Days => "days",
            DurationUnit::Months => "months",
            DurationUnit::Years => "years",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "days" => Some(DurationUnit::Days),
            "months" => Some(DurationUnit::Months),
            "years" => Some(DurationUnit::Years),
            _ => None,
        }
    }
}

impl std::fmt::Display for DurationUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Discriminates the two disjoint revenue pools.
///
/// `GymSubscription` payments are platform revenue; `MemberSubscription`
/// payments are tenant revenue. Aggregations must never sum across kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentKind {
    GymSubscription,
    MemberSubscription,
}

impl PaymentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentKind::GymSubscription => "gym_manager_subscription",
            PaymentKind::MemberSubscription => "member_subscription",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "gym_manager_subscription" => Some(PaymentKind::GymSubscription),
            "member_subscription" => Some(PaymentKind::MemberSubscription),
            _ => None,
        }
    }
}

impl std::fmt::Display for PaymentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Settlement status of a payment record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payment methods accepted for platform (gym) subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformPaymentMethod {
    Stripe,
    Paypal,
    Local,
}

impl PlatformPaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformPaymentMethod::Stripe => "stripe",
            PlatformPaymentMethod::Paypal => "paypal",
            PlatformPaymentMethod::Local => "local",
        }
    }
}

impl std::fmt::Display for PlatformPaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payment methods a gym accepts from its members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberPaymentMethod {
    Cash,
    Card,
    Online,
    Other,
}

impl MemberPaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberPaymentMethod::Cash => "cash",
            MemberPaymentMethod::Card => "card",
            MemberPaymentMethod::Online => "online",
            MemberPaymentMethod::Other => "other",
        }
    }
}

impl Default for MemberPaymentMethod {
    fn default() -> Self {
        MemberPaymentMethod::Cash
    }
}

impl std::fmt::Display for MemberPaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Report categories a gym can generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    Revenue,
    Members,
    Attendance,
    Subscriptions,
    Custom,
}

impl ReportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::Revenue => "revenue",
            ReportType::Members => "members",
            ReportType::Attendance => "attendance",
            ReportType::Subscriptions => "subscriptions",
            ReportType::Custom => "custom",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "revenue" => Some(ReportType::Revenue),
            "members" => Some(ReportType::Members),
            "attendance" => Some(ReportType::Attendance),
            "subscriptions" => Some(ReportType::Subscriptions),
            "custom" => Some(ReportType::Custom),
            _ => None,
        }
    }
}

impl std::fmt::Display for ReportType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn principal_kind_round_trips() {
        assert_eq!(
            PrincipalKind::parse(PrincipalKind::Admin.as_str()),
            Some(PrincipalKind::Admin)
        );
        assert_eq!(
            PrincipalKind::parse(PrincipalKind::GymManager.as_str()),
            Some(PrincipalKind::GymManager)
        );
        assert_eq!(PrincipalKind::parse("superuser"), None);
    }

    #[test]
    fn payment_kinds_are_distinct_strings() {
        // The two revenue pools must never collapse to the same discriminant.
        assert_ne!(
            PaymentKind::GymSubscription.as_str(),
            PaymentKind::MemberSubscription.as_str()
        );
    }

    #[test]
    fn gym_status_serde_uses_snake_case() {
        let json = serde_json::to_string(&GymSubscriptionStatus::Expired).unwrap();
        assert_eq!(json, "\"expired\"");
        let back: GymSubscriptionStatus = serde_json::from_str("\"suspended\"").unwrap();
        assert_eq!(back, GymSubscriptionStatus::Suspended);
    }
}
