// Shared crate clippy configuration
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Shared building blocks for the Gymstack workspace
//!
//! Database pool helpers, the domain enums used across the API and billing
//! crates, calendar arithmetic for subscription periods, pagination types,
//! and the in-memory rate limiter.

pub mod db;
pub mod pagination;
pub mod period;
pub mod rate_limit;
pub mod types;

pub use db::{create_pool, run_migrations};
pub use pagination::{PageInfo, PageQuery};
pub use period::{advance_period, session_minutes};
pub use rate_limit::{RateLimitDecision, RateLimiter};
pub use types::{
    DurationUnit, GymSubscriptionStatus, MemberPaymentMethod, MemberSubscriptionStatus,
    PaymentKind, PaymentStatus, PlatformPaymentMethod, PrincipalKind, ReportType,
};
