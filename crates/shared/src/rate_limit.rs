//! In-memory fixed-window rate limiter
//!
//! One window per key (client IP, optionally suffixed with a route class).
//! State lives in-process; a multi-instance deployment gets per-instance
//! limits, which is acceptable for the thresholds involved.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::Mutex;

/// Maximum tracked keys before the oldest windows are evicted, so a flood
/// of unique client addresses cannot grow memory without bound.
const MAX_TRACKED_KEYS: usize = 50_000;

#[derive(Debug, Clone, Copy)]
struct Window {
    started: DateTime<Utc>,
    count: u32,
}

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: u32,
    pub retry_after_seconds: Option<i64>,
}

#[derive(Clone)]
pub struct RateLimiter {
    windows: Arc<Mutex<HashMap<String, Window>>>,
}

impl RateLimiter {
    pub fn new_in_memory() -> Self {
        Self {
            windows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Count one request against `key`. `limit` requests are allowed per
    /// `window_seconds`; the first request past the limit is rejected with
    /// a retry-after hint pointing at the window end.
    pub async fn check(&self, key: &str, limit: u32, window_seconds: i64) -> RateLimitDecision {
        let now = Utc::now();
        let window_len = TimeDelta::seconds(window_seconds.max(1));
        let mut windows = self.windows.lock().await;

        if windows.len() >= MAX_TRACKED_KEYS && !windows.contains_key(key) {
            if let Some(oldest) = windows
                .iter()
                .min_by_key(|(_, w)| w.started)
                .map(|(k, _)| k.clone())
            {
                windows.remove(&oldest);
            }
        }

        let window = windows.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });

        if now - window.started >= window_len {
            window.started = now;
            window.count = 0;
        }

        if window.count >= limit {
            let retry_after = (window.started + window_len - now).num_seconds().max(1);
            return RateLimitDecision {
                allowed: false,
                remaining: 0,
                retry_after_seconds: Some(retry_after),
            };
        }

        window.count += 1;
        RateLimitDecision {
            allowed: true,
            remaining: limit - window.count,
            retry_after_seconds: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_request_is_allowed() {
        let limiter = RateLimiter::new_in_memory();
        let decision = limiter.check("10.0.0.1", 5, 60).await;
        assert!(decision.allowed);
        assert_eq!(decision.remaining, 4);
    }

    #[tokio::test]
    async fn request_past_limit_is_rejected_with_retry_hint() {
        let limiter = RateLimiter::new_in_memory();
        for i in 0..5 {
            let decision = limiter.check("10.0.0.2", 5, 60).await;
            assert!(decision.allowed, "request {} should be allowed", i);
        }
        let decision = limiter.check("10.0.0.2", 5, 60).await;
        assert!(!decision.allowed);
        assert!(decision.retry_after_seconds.is_some());
    }

    #[tokio::test]
    async fn keys_are_independent() {
        let limiter = RateLimiter::new_in_memory();
        for _ in 0..5 {
            limiter.check("10.0.0.3", 5, 60).await;
        }
        let other = limiter.check("10.0.0.4", 5, 60).await;
        assert!(other.allowed);
    }
}
