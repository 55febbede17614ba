//! Sliding-window throttling for public submissions.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use axum::http::HeaderMap;
use dashmap::DashMap;
use time::OffsetDateTime;
use tracing::warn;

use crate::application::repos::RepoError;

pub const RATE_LIMITED_MESSAGE: &str = "Too many submissions. Please try again in a minute.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub max_requests: u32,
    pub window: Duration,
}

impl RateLimitPolicy {
    pub const fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
        }
    }
}

/// Limits applied by lead intake, one per form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionPolicies {
    pub consultation: RateLimitPolicy,
    pub audit: RateLimitPolicy,
}

impl Default for SubmissionPolicies {
    fn default() -> Self {
        Self {
            consultation: RateLimitPolicy::new(5, Duration::from_secs(60)),
            audit: RateLimitPolicy::new(3, Duration::from_secs(60)),
        }
    }
}

#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Record one attempt against `key`. Denied attempts are not recorded.
    async fn check(&self, key: &str, max_requests: u32, window: Duration) -> RateLimitDecision;
}

/// Per-process limiter keeping recent attempt instants per key.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRateLimiter {
    buckets: Arc<DashMap<String, Vec<Instant>>>,
}

impl InMemoryRateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check_at(
        &self,
        key: &str,
        max_requests: u32,
        window: Duration,
        now: Instant,
    ) -> RateLimitDecision {
        let mut entry = self.buckets.entry(key.to_string()).or_default();
        entry.retain(|instant| now.saturating_duration_since(*instant) < window);

        let used = u32::try_from(entry.len()).unwrap_or(u32::MAX);
        let remaining = max_requests.saturating_sub(used);
        if remaining == 0 {
            return RateLimitDecision {
                allowed: false,
                remaining: 0,
            };
        }

        entry.push(now);
        RateLimitDecision {
            allowed: true,
            remaining: remaining - 1,
        }
    }

    /// Drop keys with no attempt inside `window`. Returns the number of keys removed.
    pub fn sweep(&self, window: Duration) -> usize {
        let now = Instant::now();
        let before = self.buckets.len();
        self.buckets.retain(|_, instants| {
            instants.retain(|instant| now.saturating_duration_since(*instant) < window);
            !instants.is_empty()
        });
        before.saturating_sub(self.buckets.len())
    }

    pub fn tracked_keys(&self) -> usize {
        self.buckets.len()
    }
}

#[async_trait]
impl RateLimiter for InMemoryRateLimiter {
    async fn check(&self, key: &str, max_requests: u32, window: Duration) -> RateLimitDecision {
        self.check_at(key, max_requests, window, Instant::now())
    }
}

/// Attempt counter for the current window of one key.
#[derive(Debug, Clone)]
pub struct AttemptInfo {
    pub attempt_count: i32,
    pub window_started_at: OffsetDateTime,
}

/// Shared counter table for deployments running several instances.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Count one attempt, starting a fresh window when the stored one has expired.
    async fn record_attempt(&self, key: &str, window: Duration) -> Result<AttemptInfo, RepoError>;

    async fn cleanup_expired(&self, before: OffsetDateTime) -> Result<u64, RepoError>;
}

/// Fixed-window limiter over a [`RateLimitStore`]. Store failures let the attempt through.
#[derive(Clone)]
pub struct StoreRateLimiter {
    store: Arc<dyn RateLimitStore>,
}

impl StoreRateLimiter {
    pub fn new(store: Arc<dyn RateLimitStore>) -> Self {
        Self { store }
    }

    pub async fn cleanup(&self, retention: Duration) -> Result<u64, RepoError> {
        let cutoff = OffsetDateTime::now_utc() - retention;
        self.store.cleanup_expired(cutoff).await
    }
}

#[async_trait]
impl RateLimiter for StoreRateLimiter {
    async fn check(&self, key: &str, max_requests: u32, window: Duration) -> RateLimitDecision {
        match self.store.record_attempt(key, window).await {
            Ok(info) => {
                let count = u32::try_from(info.attempt_count).unwrap_or(0);
                RateLimitDecision {
                    allowed: count <= max_requests,
                    remaining: max_requests.saturating_sub(count),
                }
            }
            Err(err) => {
                warn!(
                    target = "jdigital::application::rate_limit",
                    key,
                    error = %err,
                    "rate limit store unavailable; allowing attempt"
                );
                RateLimitDecision {
                    allowed: true,
                    remaining: max_requests,
                }
            }
        }
    }
}

/// Resolve the key used to throttle a visitor.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>, trust_forwarded_for: bool) -> String {
    if trust_forwarded_for
        && let Some(first) = headers
            .get("x-forwarded-for")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    {
        return first.to_string();
    }

    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

pub fn audit_key(ip: &str) -> String {
    format!("{ip}-audit")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use std::sync::Mutex;

    #[test]
    fn sixth_attempt_in_window_is_denied() {
        let limiter = InMemoryRateLimiter::new();
        let window = Duration::from_secs(60);
        let start = Instant::now();

        for attempt in 0..5 {
            let decision = limiter.check_at("203.0.113.9", 5, window, start);
            assert!(decision.allowed, "attempt {attempt} should pass");
            assert_eq!(decision.remaining, 4 - attempt);
        }

        let denied = limiter.check_at("203.0.113.9", 5, window, start + Duration::from_secs(59));
        assert_eq!(
            denied,
            RateLimitDecision {
                allowed: false,
                remaining: 0
            }
        );

        let later = limiter.check_at("203.0.113.9", 5, window, start + Duration::from_secs(61));
        assert!(later.allowed);
    }

    #[test]
    fn keys_are_independent() {
        let limiter = InMemoryRateLimiter::new();
        let window = Duration::from_secs(60);
        let now = Instant::now();
        for _ in 0..3 {
            assert!(limiter.check_at("1.1.1.1-audit", 3, window, now).allowed);
        }
        assert!(!limiter.check_at("1.1.1.1-audit", 3, window, now).allowed);
        assert!(limiter.check_at("1.1.1.1", 5, window, now).allowed);
    }

    #[test]
    fn sweep_removes_idle_keys() {
        let limiter = InMemoryRateLimiter::new();
        limiter.check_at("a", 5, Duration::from_secs(60), Instant::now());
        assert_eq!(limiter.sweep(Duration::ZERO), 1);
        assert_eq!(limiter.tracked_keys(), 0);
    }

    #[test]
    fn client_ip_prefers_first_forwarded_entry() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("198.51.100.7, 10.0.0.1"),
        );
        let peer: SocketAddr = "10.0.0.2:5555".parse().unwrap();

        assert_eq!(client_ip(&headers, Some(peer), true), "198.51.100.7");
        assert_eq!(client_ip(&headers, Some(peer), false), "10.0.0.2");
        assert_eq!(client_ip(&HeaderMap::new(), None, true), "unknown");
    }

    struct CountingStore {
        count: Mutex<i32>,
        fail: bool,
    }

    #[async_trait]
    impl RateLimitStore for CountingStore {
        async fn record_attempt(
            &self,
            _key: &str,
            _window: Duration,
        ) -> Result<AttemptInfo, RepoError> {
            if self.fail {
                return Err(RepoError::Timeout);
            }
            let mut count = self.count.lock().unwrap();
            *count += 1;
            Ok(AttemptInfo {
                attempt_count: *count,
                window_started_at: OffsetDateTime::now_utc(),
            })
        }

        async fn cleanup_expired(&self, _before: OffsetDateTime) -> Result<u64, RepoError> {
            Ok(0)
        }
    }

    #[tokio::test]
    async fn store_limiter_denies_past_limit_and_fails_open() {
        let limiter = StoreRateLimiter::new(Arc::new(CountingStore {
            count: Mutex::new(0),
            fail: false,
        }));
        let window = Duration::from_secs(60);
        for _ in 0..3 {
            assert!(limiter.check("k", 3, window).await.allowed);
        }
        assert!(!limiter.check("k", 3, window).await.allowed);

        let broken = StoreRateLimiter::new(Arc::new(CountingStore {
            count: Mutex::new(0),
            fail: true,
        }));
        assert!(broken.check("k", 3, window).await.allowed);
    }
}
