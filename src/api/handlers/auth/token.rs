//! Session token codec.
//!
//! Tokens are compact HS256-signed JWTs carrying `{sub, type, jti, exp}`.
//! The codec verifies signature and expiry only; token type and revocation
//! are checked by the callers that know the expected use.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClaims {
    /// Subject: the user id as a string.
    pub sub: String,
    #[serde(rename = "type")]
    pub kind: TokenKind,
    /// Unique token id, used only as a revocation-list key.
    pub jti: String,
    /// Absolute expiry as unix seconds.
    pub exp: i64,
}

impl SessionClaims {
    /// Remaining lifetime in seconds; zero once expired.
    #[must_use]
    pub fn remaining_seconds(&self, now_unix: i64) -> i64 {
        (self.exp - now_unix).max(0)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("invalid token")]
    Invalid,
    #[error("failed to sign token")]
    Signing,
}

/// A freshly signed token together with its revocation id and expiry.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub jti: String,
    pub expires_at: i64,
}

pub(crate) fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX)
        })
}

/// Sign a new token for `user_id` with a fresh random `jti`.
///
/// # Errors
///
/// Returns `TokenError::Signing` if serialization or signing fails.
pub(super) fn encode_token(
    secret: &SecretString,
    user_id: Uuid,
    kind: TokenKind,
    ttl_seconds: i64,
) -> Result<IssuedToken, TokenError> {
    let jti = Uuid::new_v4().to_string();
    let expires_at = now_unix() + ttl_seconds;
    let claims = SessionClaims {
        sub: user_id.to_string(),
        kind,
        jti: jti.clone(),
        exp: expires_at,
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.expose_secret().as_bytes()),
    )
    .map_err(|_| TokenError::Signing)?;

    Ok(IssuedToken {
        token,
        jti,
        expires_at,
    })
}

/// Verify signature and expiry and return the claims.
///
/// # Errors
///
/// Returns an error if:
/// - the token is malformed or its signature does not verify,
/// - any field was tampered with,
/// - the expiry is in the past.
pub(super) fn decode_token(
    secret: &SecretString,
    token: &str,
) -> Result<SessionClaims, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.expose_secret().as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|err| match err.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Invalid,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_secret() -> SecretString {
        SecretString::from("0123456789abcdef0123456789abcdef")
    }

    #[test]
    fn round_trips_subject_and_kind() -> Result<(), TokenError> {
        let secret = test_secret();
        let user_id = Uuid::new_v4();
        let issued = encode_token(&secret, user_id, TokenKind::Access, 60)?;

        let claims = decode_token(&secret, &issued.token)?;
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.kind, TokenKind::Access);
        assert_eq!(claims.jti, issued.jti);
        assert_eq!(claims.exp, issued.expires_at);
        Ok(())
    }

    #[test]
    fn jti_is_unique_per_token() -> Result<(), TokenError> {
        let secret = test_secret();
        let user_id = Uuid::new_v4();
        let first = encode_token(&secret, user_id, TokenKind::Access, 60)?;
        let second = encode_token(&secret, user_id, TokenKind::Access, 60)?;
        assert_ne!(first.jti, second.jti);
        Ok(())
    }

    #[test]
    fn expired_token_rejected() -> Result<(), TokenError> {
        let secret = test_secret();
        let issued = encode_token(&secret, Uuid::new_v4(), TokenKind::Access, -30)?;
        let result = decode_token(&secret, &issued.token);
        assert_eq!(result, Err(TokenError::Expired));
        Ok(())
    }

    #[test]
    fn wrong_secret_rejected() -> Result<(), TokenError> {
        let issued = encode_token(&test_secret(), Uuid::new_v4(), TokenKind::Access, 60)?;
        let other = SecretString::from("fedcba9876543210fedcba9876543210");
        assert_eq!(decode_token(&other, &issued.token), Err(TokenError::Invalid));
        Ok(())
    }

    #[test]
    fn tampered_signature_rejected() -> Result<(), TokenError> {
        let secret = test_secret();
        let issued = encode_token(&secret, Uuid::new_v4(), TokenKind::Access, 60)?;

        let mut tampered = issued.token.clone();
        let last = tampered.pop().unwrap_or('A');
        tampered.push(if last == 'A' { 'B' } else { 'A' });

        assert_eq!(decode_token(&secret, &tampered), Err(TokenError::Invalid));
        Ok(())
    }

    #[test]
    fn tampered_payload_rejected() -> Result<(), TokenError> {
        let secret = test_secret();
        let issued = encode_token(&secret, Uuid::new_v4(), TokenKind::Access, 60)?;

        let mut parts = issued.token.splitn(3, '.');
        let header = parts.next().unwrap_or_default();
        let payload = parts.next().unwrap_or_default();
        let signature = parts.next().unwrap_or_default();

        let mut payload = payload.to_string();
        let first = payload.remove(0);
        payload.insert(0, if first == 'e' { 'f' } else { 'e' });

        let tampered = format!("{header}.{payload}.{signature}");
        assert_eq!(decode_token(&secret, &tampered), Err(TokenError::Invalid));
        Ok(())
    }

    #[test]
    fn garbage_rejected() {
        assert_eq!(
            decode_token(&test_secret(), "not-a-token"),
            Err(TokenError::Invalid)
        );
    }

    #[test]
    fn kind_serializes_lowercase() -> anyhow::Result<()> {
        let json = serde_json::to_string(&TokenKind::Access)?;
        assert_eq!(json, "\"access\"");
        let json = serde_json::to_string(&TokenKind::Refresh)?;
        assert_eq!(json, "\"refresh\"");
        Ok(())
    }

    #[test]
    fn remaining_seconds_clamps_to_zero() {
        let claims = SessionClaims {
            sub: "user".to_string(),
            kind: TokenKind::Access,
            jti: "jti".to_string(),
            exp: 100,
        };
        assert_eq!(claims.remaining_seconds(40), 60);
        assert_eq!(claims.remaining_seconds(100), 0);
        assert_eq!(claims.remaining_seconds(160), 0);
    }
}
