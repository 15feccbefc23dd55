//! Auth state and configuration.
//!
//! `AuthConfig` is built once at process start and injected everywhere via
//! `AuthState`; core logic never reads ambient global state.

use secrecy::SecretString;
use std::sync::Arc;

use super::rate_limit::RateLimiter;
use super::revocation::RevocationStore;

const DEFAULT_ACCESS_TTL_SECONDS: i64 = 30 * 60;
const DEFAULT_REFRESH_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;
const DEFAULT_RATE_LIMIT_MAX_REQUESTS: u32 = 10;
const DEFAULT_RATE_LIMIT_WINDOW_SECONDS: i64 = 60;

#[derive(Clone)]
pub struct AuthConfig {
    secret_key: SecretString,
    production: bool,
    access_ttl_seconds: i64,
    refresh_ttl_seconds: i64,
    rate_limit_max_requests: u32,
    rate_limit_window_seconds: i64,
}

impl AuthConfig {
    #[must_use]
    pub fn new(secret_key: SecretString) -> Self {
        Self {
            secret_key,
            production: false,
            access_ttl_seconds: DEFAULT_ACCESS_TTL_SECONDS,
            refresh_ttl_seconds: DEFAULT_REFRESH_TTL_SECONDS,
            rate_limit_max_requests: DEFAULT_RATE_LIMIT_MAX_REQUESTS,
            rate_limit_window_seconds: DEFAULT_RATE_LIMIT_WINDOW_SECONDS,
        }
    }

    #[must_use]
    pub fn with_production(mut self, production: bool) -> Self {
        self.production = production;
        self
    }

    #[must_use]
    pub fn with_access_ttl_seconds(mut self, seconds: i64) -> Self {
        self.access_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_refresh_ttl_seconds(mut self, seconds: i64) -> Self {
        self.refresh_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_rate_limit_max_requests(mut self, max_requests: u32) -> Self {
        self.rate_limit_max_requests = max_requests;
        self
    }

    #[must_use]
    pub fn with_rate_limit_window_seconds(mut self, seconds: i64) -> Self {
        self.rate_limit_window_seconds = seconds;
        self
    }

    pub(super) fn secret_key(&self) -> &SecretString {
        &self.secret_key
    }

    /// Cookies are only marked `Secure` in production deployments.
    pub(super) fn cookie_secure(&self) -> bool {
        self.production
    }

    #[must_use]
    pub fn access_ttl_seconds(&self) -> i64 {
        self.access_ttl_seconds
    }

    #[must_use]
    pub fn refresh_ttl_seconds(&self) -> i64 {
        self.refresh_ttl_seconds
    }

    #[must_use]
    pub fn rate_limit_max_requests(&self) -> u32 {
        self.rate_limit_max_requests
    }

    #[must_use]
    pub fn rate_limit_window_seconds(&self) -> i64 {
        self.rate_limit_window_seconds
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret_key", &"***")
            .field("production", &self.production)
            .field("access_ttl_seconds", &self.access_ttl_seconds)
            .field("refresh_ttl_seconds", &self.refresh_ttl_seconds)
            .field("rate_limit_max_requests", &self.rate_limit_max_requests)
            .field("rate_limit_window_seconds", &self.rate_limit_window_seconds)
            .finish()
    }
}

pub struct AuthState {
    config: AuthConfig,
    rate_limiter: Arc<dyn RateLimiter>,
    revocations: RevocationStore,
}

impl AuthState {
    #[must_use]
    pub fn new(
        config: AuthConfig,
        rate_limiter: Arc<dyn RateLimiter>,
        revocations: RevocationStore,
    ) -> Self {
        Self {
            config,
            rate_limiter,
            revocations,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub(super) fn rate_limiter(&self) -> &dyn RateLimiter {
        self.rate_limiter.as_ref()
    }

    pub(crate) fn revocations(&self) -> &RevocationStore {
        &self.revocations
    }
}

#[cfg(test)]
mod tests {
    use super::super::rate_limit::NoopRateLimiter;
    use super::*;

    fn test_config() -> AuthConfig {
        AuthConfig::new(SecretString::from("0123456789abcdef0123456789abcdef"))
    }

    #[test]
    fn auth_config_defaults_and_overrides() {
        let config = test_config();

        assert!(!config.cookie_secure());
        assert_eq!(config.access_ttl_seconds(), DEFAULT_ACCESS_TTL_SECONDS);
        assert_eq!(config.refresh_ttl_seconds(), DEFAULT_REFRESH_TTL_SECONDS);
        assert_eq!(
            config.rate_limit_max_requests(),
            DEFAULT_RATE_LIMIT_MAX_REQUESTS
        );
        assert_eq!(
            config.rate_limit_window_seconds(),
            DEFAULT_RATE_LIMIT_WINDOW_SECONDS
        );

        let config = config
            .with_production(true)
            .with_access_ttl_seconds(120)
            .with_refresh_ttl_seconds(3600)
            .with_rate_limit_max_requests(3)
            .with_rate_limit_window_seconds(10);

        assert!(config.cookie_secure());
        assert_eq!(config.access_ttl_seconds(), 120);
        assert_eq!(config.refresh_ttl_seconds(), 3600);
        assert_eq!(config.rate_limit_max_requests(), 3);
        assert_eq!(config.rate_limit_window_seconds(), 10);
    }

    #[test]
    fn debug_masks_secret_key() {
        let config = test_config();
        let debug = format!("{config:?}");
        assert!(debug.contains("***"));
        assert!(!debug.contains("0123456789abcdef"));
    }

    #[test]
    fn auth_state_constructs_with_noop_rate_limiter() {
        let client = redis::Client::open("redis://localhost:6379")
            .expect("static test URL should parse");
        let state = AuthState::new(
            test_config(),
            Arc::new(NoopRateLimiter),
            RevocationStore::new(client),
        );
        assert_eq!(state.config().rate_limit_max_requests(), 10);
    }
}
