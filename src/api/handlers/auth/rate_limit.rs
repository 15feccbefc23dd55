//! Fixed-window rate limiting for auth endpoints.
//!
//! Counters live in Redis under `rate:auth:{ip}:{window}` where `window` is
//! the clock-aligned bucket index. The first increment in a bucket sets the
//! expiry, so counters never persist much past the window they count.

use async_trait::async_trait;
use tracing::warn;

use super::token::now_unix;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    Limited,
}

#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Count a request from `client_ip` and decide whether it may proceed.
    async fn check(&self, client_ip: &str) -> RateLimitDecision;
}

/// Counter keyed by `(client address, fixed window)` in Redis.
pub struct FixedWindowLimiter {
    client: redis::Client,
    max_requests: u32,
    window_seconds: i64,
}

impl FixedWindowLimiter {
    #[must_use]
    pub fn new(client: redis::Client, max_requests: u32, window_seconds: i64) -> Self {
        Self {
            client,
            max_requests,
            window_seconds,
        }
    }

    fn window_key(&self, client_ip: &str, now_unix: i64) -> String {
        let window = now_unix.div_euclid(self.window_seconds);
        format!("rate:auth:{client_ip}:{window}")
    }

    async fn increment(&self, key: &str) -> Result<u64, redis::RedisError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let count: u64 = redis::cmd("INCR").arg(key).query_async(&mut conn).await?;
        if count == 1 {
            // First hit in the window owns the expiry. Two concurrent first
            // hits both setting the same TTL is a benign race.
            if let Err(err) = redis::cmd("EXPIRE")
                .arg(key)
                .arg(self.window_seconds)
                .query_async::<()>(&mut conn)
                .await
            {
                warn!("Failed to set rate-limit window expiry: {err}");
            }
        }
        Ok(count)
    }
}

#[async_trait]
impl RateLimiter for FixedWindowLimiter {
    async fn check(&self, client_ip: &str) -> RateLimitDecision {
        let key = self.window_key(client_ip, now_unix());
        match self.increment(&key).await {
            Ok(count) if count > u64::from(self.max_requests) => RateLimitDecision::Limited,
            Ok(_) => RateLimitDecision::Allowed,
            Err(err) => {
                // Never block legitimate traffic on an infrastructure outage.
                warn!("Rate-limit store unavailable, allowing request: {err}");
                RateLimitDecision::Allowed
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct NoopRateLimiter;

#[async_trait]
impl RateLimiter for NoopRateLimiter {
    async fn check(&self, _client_ip: &str) -> RateLimitDecision {
        RateLimitDecision::Allowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_rate_limiter_allows() {
        let limiter = NoopRateLimiter;
        assert_eq!(limiter.check("192.0.2.1").await, RateLimitDecision::Allowed);
    }

    #[test]
    fn window_key_is_stable_within_a_window() {
        let client = redis::Client::open("redis://localhost:6379")
            .expect("static test URL should parse");
        let limiter = FixedWindowLimiter::new(client, 10, 60);

        assert_eq!(
            limiter.window_key("192.0.2.1", 120),
            limiter.window_key("192.0.2.1", 179)
        );
        assert_eq!(limiter.window_key("192.0.2.1", 120), "rate:auth:192.0.2.1:2");
    }

    #[test]
    fn window_key_rolls_over() {
        let client = redis::Client::open("redis://localhost:6379")
            .expect("static test URL should parse");
        let limiter = FixedWindowLimiter::new(client, 10, 60);

        assert_ne!(
            limiter.window_key("192.0.2.1", 179),
            limiter.window_key("192.0.2.1", 180)
        );
    }

    #[test]
    fn window_key_separates_addresses() {
        let client = redis::Client::open("redis://localhost:6379")
            .expect("static test URL should parse");
        let limiter = FixedWindowLimiter::new(client, 10, 60);

        assert_ne!(
            limiter.window_key("192.0.2.1", 120),
            limiter.window_key("192.0.2.2", 120)
        );
    }
}
