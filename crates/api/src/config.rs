//! Environment-driven configuration

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub bind_address: String,
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    pub allowed_origins: Vec<String>,
    pub request_timeout_secs: u64,
    pub body_limit_bytes: usize,
    /// General API rate limit per window per client.
    pub rate_limit_max: u32,
    /// Stricter limit applied to login/register routes.
    pub rate_limit_auth_max: u32,
    pub rate_limit_window_secs: i64,
    /// Empty when Stripe is not configured; payment routes then use the
    /// local gateway.
    pub stripe_secret_key: String,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let jwt_secret = std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?;

        let allowed_origins = std::env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000,http://127.0.0.1:3000".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            database_url,
            db_max_connections: env_or("DATABASE_MAX_CONNECTIONS", 10),
            bind_address: std::env::var("BIND_ADDRESS")
                .unwrap_or_else(|_| "0.0.0.0:5000".to_string()),
            jwt_secret,
            jwt_expiry_hours: env_or("JWT_EXPIRY_HOURS", 168),
            allowed_origins,
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 30),
            body_limit_bytes: env_or("REQUEST_BODY_LIMIT_BYTES", 10 * 1024 * 1024),
            rate_limit_max: env_or("RATE_LIMIT_MAX", 100),
            rate_limit_auth_max: env_or("RATE_LIMIT_AUTH_MAX", 5),
            rate_limit_window_secs: env_or("RATE_LIMIT_WINDOW_SECS", 900),
            stripe_secret_key: std::env::var("STRIPE_SECRET_KEY").unwrap_or_default(),
        })
    }
}
