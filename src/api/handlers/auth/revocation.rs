//! Token revocation list over Redis.
//!
//! Revocation is a negative list: the key `blacklist:jti:{jti}` exists only
//! while the revoked token could still be presented, so entries never outlive
//! the token they revoke. Absence of an entry means "not revoked".

use thiserror::Error;

const BLACKLIST_PREFIX: &str = "blacklist:jti:";

#[derive(Debug, Error)]
#[error("revocation store unavailable: {0}")]
pub struct StoreUnavailable(#[from] redis::RedisError);

#[derive(Clone)]
pub struct RevocationStore {
    client: redis::Client,
}

impl RevocationStore {
    #[must_use]
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }

    /// Record `jti` as revoked for the remaining token lifetime.
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` if Redis cannot be reached; callers decide
    /// whether that is fatal (logout logs it, refresh degrades open).
    pub async fn revoke(&self, jti: &str, ttl_seconds: i64) -> Result<(), StoreUnavailable> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        redis::cmd("SETEX")
            .arg(blacklist_key(jti))
            .arg(ttl_seconds)
            .arg("1")
            .query_async::<()>(&mut conn)
            .await?;
        Ok(())
    }

    /// Check whether `jti` has been revoked.
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` if Redis cannot be reached. Request-path
    /// callers pattern-match this into "not revoked" (degrade open).
    pub async fn is_revoked(&self, jti: &str) -> Result<bool, StoreUnavailable> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let marker: Option<String> = redis::cmd("GET")
            .arg(blacklist_key(jti))
            .query_async(&mut conn)
            .await?;
        Ok(marker.is_some())
    }

    /// Liveness probe used by the health endpoint.
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` if Redis cannot be reached.
    pub async fn ping(&self) -> Result<(), StoreUnavailable> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        redis::cmd("PING").query_async::<()>(&mut conn).await?;
        Ok(())
    }
}

fn blacklist_key(jti: &str) -> String {
    format!("{BLACKLIST_PREFIX}{jti}")
}
