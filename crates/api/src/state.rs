//! Application state

use std::sync::Arc;

use sqlx::PgPool;

use gymstack_billing::{
    LocalGateway, MemberPlanService, MemberSubscriptionService, PaymentGateway, PaymentService,
    PlanService, ReportService, StripeGateway, SubscriptionService,
};
use gymstack_shared::RateLimiter;

use crate::auth::JwtManager;
use crate::config::Config;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub jwt_manager: JwtManager,
    pub rate_limiter: RateLimiter,
    pub plans: PlanService,
    pub member_plans: MemberPlanService,
    pub subscriptions: SubscriptionService,
    pub member_subscriptions: MemberSubscriptionService,
    pub payments: PaymentService,
    pub reports: ReportService,
    /// Injected payment gateway: Stripe when configured, local otherwise.
    pub gateway: Arc<dyn PaymentGateway>,
}

impl AppState {
    pub fn new(pool: PgPool, config: Config) -> Self {
        let jwt_manager = JwtManager::new(&config.jwt_secret, config.jwt_expiry_hours);

        let gateway: Arc<dyn PaymentGateway> = if config.stripe_secret_key.is_empty() {
            tracing::warn!("Stripe not configured (missing STRIPE_SECRET_KEY) - using local gateway");
            Arc::new(LocalGateway)
        } else {
            tracing::info!("Stripe payment gateway initialized");
            Arc::new(StripeGateway::new(&config.stripe_secret_key))
        };

        let rate_limiter = RateLimiter::new_in_memory();
        tracing::info!("Rate limiter initialized");

        Self {
            jwt_manager,
            rate_limiter,
            plans: PlanService::new(pool.clone()),
            member_plans: MemberPlanService::new(pool.clone()),
            subscriptions: SubscriptionService::new(pool.clone()),
            member_subscriptions: MemberSubscriptionService::new(pool.clone()),
            payments: PaymentService::new(pool.clone()),
            reports: ReportService::new(pool.clone()),
            gateway,
            pool,
            config,
        }
    }
}
