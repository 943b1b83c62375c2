// Billing crate clippy configuration
// Test code patterns (expected in test files):
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Gymstack Billing Module
//!
//! The subscription-lifecycle core of the platform.
//!
//! ## Features
//!
//! - **Platform plans**: the catalog sold to gym managers
//! - **Platform subscriptions**: create, update, cancel; gym status is
//!   mirrored transactionally
//! - **Member plans & subscriptions**: per-tenant catalog plus dual-mode
//!   (catalog or manual) subscription creation
//! - **Payments**: settled payment records split into two disjoint revenue
//!   pools (platform vs tenant)
//! - **Reports**: immutable aggregation snapshots with typed payloads
//! - **Gateway**: injected payment-gateway abstraction (Stripe or local)
//! - **Invariants**: runnable consistency checks over billing data

#[cfg(test)]
mod edge_case_tests;

pub mod error;
pub mod gateway;
pub mod invariants;
pub mod member_plans;
pub mod member_subscriptions;
pub mod models;
pub mod payments;
pub mod plans;
pub mod reports;
pub mod subscriptions;
pub mod tenant;

// Error
pub use error::{BillingError, BillingResult};

// Gateway
pub use gateway::{ChargeOutcome, LocalGateway, PaymentGateway, StripeGateway};

// Invariants
pub use invariants::{BillingInvariants, InvariantCheckSummary, InvariantViolation, ViolationSeverity};

// Models
pub use models::{GymSubscription, MemberPlan, MemberSubscription, Payment, Report, SubscriptionPlan};

// Plans
pub use member_plans::{MemberPlanPatch, MemberPlanService, NewMemberPlan};
pub use plans::{NewPlan, PlanPatch, PlanService};

// Subscriptions
pub use member_subscriptions::{
    MemberSubscriptionFilters, MemberSubscriptionPatch, MemberSubscriptionService,
    NewMemberSubscription, PlanTerms,
};
pub use subscriptions::{
    GymSubscriptionPatch, NewGymSubscription, SubscriptionFilters, SubscriptionService,
};

// Payments
pub use payments::{NewPayment, PaymentFilters, PaymentService, RevenueStats};

// Reports
pub use reports::{ReportData, ReportPeriod, ReportService};

// Tenant
pub use tenant::TenantScope;
