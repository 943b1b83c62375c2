//! Authentication, authorization, and tenant-isolation middleware
//!
//! Chain order on protected routes: `admin_auth`/`gym_auth` resolves the
//! bearer token into a principal and attaches it, then `require_admin` /
//! `require_gym_manager` gate on principal kind. `gym_auth` additionally
//! enforces the business gate: a tenant whose platform subscription is not
//! `active` can authenticate but not operate, and gets the current status
//! echoed back in a 403.
//!
//! Tenant isolation: `gym_auth` is the only place a [`TenantScope`] is
//! constructed. Handlers receive it as an extension and pass it into the
//! scoped queries, so a tenant query without the gym filter does not
//! typecheck.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use gymstack_billing::TenantScope;
use gymstack_shared::types::PrincipalKind;

use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated platform admin attached to the request.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AuthAdmin {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// Authenticated gym manager attached to the request.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AuthGym {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub gym_name: String,
    pub is_active: bool,
    pub subscription_status: String,
}

/// Extract the bearer token from the Authorization header.
pub fn extract_bearer_token(request: &Request) -> Option<String> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(String::from)
}

/// Extract client IP for rate limiting (X-Forwarded-For, X-Real-IP).
pub fn extract_client_ip(request: &Request) -> String {
    if let Some(xff) = request.headers().get("X-Forwarded-For") {
        if let Ok(xff_str) = xff.to_str() {
            if let Some(first) = xff_str.split(',').next() {
                return first.trim().to_string();
            }
        }
    }
    if let Some(real_ip) = request.headers().get("X-Real-IP") {
        if let Ok(ip) = real_ip.to_str() {
            return ip.to_string();
        }
    }
    "unknown".to_string()
}

async fn authenticate_admin(
    state: &AppState,
    token: Option<String>,
) -> Result<AuthAdmin, ApiError> {
    let token = token
        .ok_or_else(|| ApiError::Unauthenticated("authentication token required".to_string()))?;

    let claims = state
        .jwt_manager
        .validate_token(&token)
        .map_err(|_| ApiError::Unauthenticated("invalid or expired token".to_string()))?;

    // Authenticated but wrong role: a tenant token on the admin surface is
    // a Forbidden, not a bad token.
    if claims.principal_kind() != Some(PrincipalKind::Admin) {
        return Err(ApiError::Forbidden("admin privileges required".to_string()));
    }

    let admin: Option<AuthAdmin> =
        sqlx::query_as("SELECT id, name, email FROM admins WHERE id = $1")
            .bind(claims.sub)
            .fetch_optional(&state.pool)
            .await?;

    admin.ok_or_else(|| ApiError::Unauthenticated("unauthorized".to_string()))
}

async fn authenticate_gym(state: &AppState, token: Option<String>) -> Result<AuthGym, ApiError> {
    let token = token
        .ok_or_else(|| ApiError::Unauthenticated("authentication token required".to_string()))?;

    let claims = state
        .jwt_manager
        .validate_token(&token)
        .map_err(|_| ApiError::Unauthenticated("invalid or expired token".to_string()))?;

    if claims.principal_kind() != Some(PrincipalKind::GymManager) {
        return Err(ApiError::Forbidden(
            "gym manager privileges required".to_string(),
        ));
    }

    let gym: Option<AuthGym> = sqlx::query_as(
        r#"
        SELECT id, name, email, gym_name, is_active, subscription_status
        FROM gym_managers WHERE id = $1
        "#,
    )
    .bind(claims.sub)
    .fetch_optional(&state.pool)
    .await?;

    let gym = match gym {
        Some(gym) if gym.is_active => gym,
        _ => return Err(ApiError::Unauthenticated("unauthorized".to_string())),
    };

    // Business gate, distinct from authentication: the account is real and
    // enabled, but tenant operations require an active platform
    // subscription.
    if gym.subscription_status != "active" {
        tracing::warn!(
            gym_id = %gym.id,
            status = %gym.subscription_status,
            "Tenant blocked: subscription not active"
        );
        return Err(ApiError::SubscriptionInactive {
            status: gym.subscription_status,
        });
    }

    Ok(gym)
}

/// Resolve an admin principal and attach it.
pub async fn admin_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = extract_bearer_token(&request);
    match authenticate_admin(&state, token).await {
        Ok(admin) => {
            request.extensions_mut().insert(admin);
            next.run(request).await
        }
        Err(err) => err.into_response(),
    }
}

/// Resolve a gym-manager principal, enforce the subscription gate, and
/// attach both the principal and its tenant scope.
pub async fn gym_auth(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let token = extract_bearer_token(&request);
    match authenticate_gym(&state, token).await {
        Ok(gym) => {
            let scope = TenantScope::new(gym.id);
            request.extensions_mut().insert(gym);
            request.extensions_mut().insert(scope);
            next.run(request).await
        }
        Err(err) => err.into_response(),
    }
}

/// Role guard: only an attached admin principal may pass. Runs after
/// `admin_auth`; a missing principal is a safe Forbidden.
pub async fn require_admin(request: Request, next: Next) -> Response {
    if request.extensions().get::<AuthAdmin>().is_none() {
        return ApiError::Forbidden("admin privileges required".to_string()).into_response();
    }
    next.run(request).await
}

/// Role guard: only an attached gym-manager principal may pass.
pub async fn require_gym_manager(request: Request, next: Next) -> Response {
    if request.extensions().get::<AuthGym>().is_none() {
        return ApiError::Forbidden("gym manager privileges required".to_string()).into_response();
    }
    next.run(request).await
}

/// Defense-in-depth ownership check for fetch-by-id handlers. The scoped
/// queries already filter by gym_id; this re-checks the fetched row's
/// owner. Admin callers pass `None` and bypass the check. A mismatch is
/// reported as NotFound so cross-tenant existence never leaks.
pub fn verify_tenant_access(
    resource_owner: Uuid,
    scope: Option<TenantScope>,
) -> Result<(), ApiError> {
    match scope {
        None => Ok(()),
        Some(scope) if scope.gym_id() == resource_owner => Ok(()),
        Some(scope) => {
            tracing::warn!(
                gym_id = %scope.gym_id(),
                owner = %resource_owner,
                "Cross-tenant access attempt"
            );
            Err(ApiError::NotFound("resource not found".to_string()))
        }
    }
}

/// General per-IP rate limit over the whole API surface.
pub async fn general_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let ip = extract_client_ip(&request);
    let decision = state
        .rate_limiter
        .check(
            &ip,
            state.config.rate_limit_max,
            state.config.rate_limit_window_secs,
        )
        .await;

    if !decision.allowed {
        return too_many_requests(decision.retry_after_seconds);
    }
    next.run(request).await
}

/// Stricter limit on login/register routes; keyed separately from the
/// general window.
pub async fn auth_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let key = format!("auth:{}", extract_client_ip(&request));
    let decision = state
        .rate_limiter
        .check(
            &key,
            state.config.rate_limit_auth_max,
            state.config.rate_limit_window_secs,
        )
        .await;

    if !decision.allowed {
        return too_many_requests(decision.retry_after_seconds);
    }
    next.run(request).await
}

fn too_many_requests(retry_after: Option<i64>) -> Response {
    let body = axum::Json(serde_json::json!({
        "success": false,
        "message": "Too many requests, please try again later.",
        "retry_after_seconds": retry_after,
    }));
    (axum::http::StatusCode::TOO_MANY_REQUESTS, body).into_response()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use axum::body::Body;

    fn request_with_header(value: Option<&str>) -> Request {
        let mut builder = Request::builder().uri("/api/gym/members");
        if let Some(v) = value {
            builder = builder.header(AUTHORIZATION, v);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn bearer_extraction_requires_scheme() {
        assert_eq!(
            extract_bearer_token(&request_with_header(Some("Bearer abc.def.ghi"))),
            Some("abc.def.ghi".to_string())
        );
        assert_eq!(extract_bearer_token(&request_with_header(Some("abc"))), None);
        assert_eq!(extract_bearer_token(&request_with_header(None)), None);
    }

    #[test]
    fn client_ip_prefers_forwarded_for_first_hop() {
        let request = Request::builder()
            .uri("/")
            .header("X-Forwarded-For", "203.0.113.9, 10.0.0.1")
            .header("X-Real-IP", "10.0.0.2")
            .body(Body::empty())
            .unwrap();
        assert_eq!(extract_client_ip(&request), "203.0.113.9");
    }

    fn test_state() -> AppState {
        // connect_lazy never touches the network; these tests only exercise
        // the pre-database parts of authentication.
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgresql://localhost/gymstack_test")
            .unwrap();
        let config = crate::config::Config {
            database_url: "postgresql://localhost/gymstack_test".to_string(),
            db_max_connections: 1,
            bind_address: "127.0.0.1:0".to_string(),
            jwt_secret: "test-jwt-secret-key-for-testing-only".to_string(),
            jwt_expiry_hours: 24,
            allowed_origins: vec![],
            request_timeout_secs: 30,
            body_limit_bytes: 1024,
            rate_limit_max: 100,
            rate_limit_auth_max: 5,
            rate_limit_window_secs: 900,
            stripe_secret_key: String::new(),
        };
        AppState::new(pool, config)
    }

    fn bearer_request(token: &str) -> Request {
        Request::builder()
            .uri("/api/admin/plans")
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn missing_token_is_unauthenticated() {
        let state = test_state();
        match super::authenticate_admin(&state, extract_bearer_token(&request_with_header(None)))
            .await
        {
            Err(ApiError::Unauthenticated(_)) => {}
            other => panic!("expected Unauthenticated, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn garbage_token_is_unauthenticated() {
        let state = test_state();
        match super::authenticate_admin(&state, extract_bearer_token(&bearer_request("not.a.jwt")))
            .await
        {
            Err(ApiError::Unauthenticated(_)) => {}
            other => panic!("expected Unauthenticated, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn tenant_token_on_admin_surface_is_forbidden() {
        // A valid gym-manager token is authenticated but the wrong role.
        let state = test_state();
        let token = state
            .jwt_manager
            .generate_token(Uuid::new_v4(), PrincipalKind::GymManager)
            .unwrap();
        match super::authenticate_admin(&state, extract_bearer_token(&bearer_request(&token))).await
        {
            Err(ApiError::Forbidden(_)) => {}
            other => panic!("expected Forbidden, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn admin_token_on_gym_surface_is_forbidden() {
        let state = test_state();
        let token = state
            .jwt_manager
            .generate_token(Uuid::new_v4(), PrincipalKind::Admin)
            .unwrap();
        match super::authenticate_gym(&state, extract_bearer_token(&bearer_request(&token))).await {
            Err(ApiError::Forbidden(_)) => {}
            other => panic!("expected Forbidden, got {:?}", other),
        }
    }

    #[test]
    fn tenant_access_mismatch_is_not_found() {
        let owner = Uuid::new_v4();
        let caller = TenantScope::new(Uuid::new_v4());

        // Admin (no scope) bypasses.
        assert!(verify_tenant_access(owner, None).is_ok());
        // Matching tenant passes.
        assert!(verify_tenant_access(owner, Some(TenantScope::new(owner))).is_ok());
        // Foreign tenant sees NotFound, not Forbidden, not the data.
        match verify_tenant_access(owner, Some(caller)) {
            Err(ApiError::NotFound(_)) => {}
            other => panic!("expected NotFound, got {:?}", other),
        }
    }
}
