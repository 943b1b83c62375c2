//! Route wiring
//!
//! Three surfaces share the `/api` prefix:
//! - auth routes (login/register) behind the stricter rate limit
//! - admin routes behind `admin_auth` + `require_admin`
//! - gym routes behind `gym_auth` + `require_gym_manager` (which also
//!   attaches the tenant scope)
//! plus the public plan/subscribe/health endpoints.

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;

use crate::auth::middleware::{
    admin_auth as admin_auth_mw, auth_rate_limit, general_rate_limit, gym_auth as gym_auth_mw,
    require_admin, require_gym_manager,
};
use crate::state::AppState;

pub mod admin_auth;
pub mod admin_gyms;
pub mod admin_payments;
pub mod admin_plans;
pub mod admin_subscriptions;
pub mod gym_attendance;
pub mod gym_auth;
pub mod gym_member_plans;
pub mod gym_members;
pub mod gym_payments;
pub mod gym_reports;
pub mod gym_subscriptions;
pub mod payment_gateway;
pub mod public;

/// Light email shape check applied at registration and subscribe.
pub fn validate_email(email: &str) -> Result<(), String> {
    let trimmed = email.trim();
    let valid = trimmed.len() >= 3
        && trimmed.split('@').count() == 2
        && trimmed
            .rsplit_once('@')
            .map(|(local, domain)| !local.is_empty() && domain.contains('.'))
            .unwrap_or(false);
    if valid {
        Ok(())
    } else {
        Err("a valid email is required".to_string())
    }
}

pub fn create_router(state: AppState) -> Router {
    // Login/register: no principal, stricter limiter.
    let auth_routes = Router::new()
        .route("/admin/auth/register", post(admin_auth::register))
        .route("/admin/auth/login", post(admin_auth::login))
        .route("/gym/auth/register", post(gym_auth::register))
        .route("/gym/auth/login", post(gym_auth::login))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_rate_limit,
        ));

    let admin_routes = Router::new()
        .route("/admin/auth/profile", get(admin_auth::profile))
        .nest("/admin/gym-managers", admin_gyms::router())
        .nest("/admin/subscriptions", admin_subscriptions::router())
        .nest("/admin/plans", admin_plans::router())
        .nest("/admin/payments", admin_payments::router())
        .nest("/payment", payment_gateway::router())
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(state.clone(), admin_auth_mw));

    let gym_routes = Router::new()
        .route("/gym/auth/profile", get(gym_auth::profile))
        .nest("/gym/members", gym_members::router())
        .nest("/gym/member-plans", gym_member_plans::router())
        .nest("/gym/subscriptions", gym_subscriptions::router())
        .nest("/gym/payments", gym_payments::router())
        .nest("/gym/attendance", gym_attendance::router())
        .nest("/gym/reports", gym_reports::router())
        .route_layer(middleware::from_fn(require_gym_manager))
        .route_layer(middleware::from_fn_with_state(state.clone(), gym_auth_mw));

    let public_routes = Router::new()
        .route("/public/plans", get(public::list_plans))
        .route("/public/plans/{id}", get(public::get_plan))
        .route("/public/subscribe", post(public::subscribe))
        .route("/health", get(public::health));

    let api = Router::new()
        .merge(auth_routes)
        .merge(admin_routes)
        .merge(gym_routes)
        .merge(public_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            general_rate_limit,
        ));

    Router::new()
        .route("/", get(public::root))
        .nest("/api", api)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation_accepts_plain_addresses() {
        assert!(validate_email("owner@gym.example").is_ok());
        assert!(validate_email("a@b.co").is_ok());
    }

    #[test]
    fn email_validation_rejects_malformed() {
        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@missing-local.example").is_err());
        assert!(validate_email("two@@ats.example").is_err());
        assert!(validate_email("no@dot").is_err());
    }
}
