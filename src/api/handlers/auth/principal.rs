//! Authenticated principal extraction.
//!
//! Flow Overview: read the access cookie, verify the token, consult the
//! revocation list, and resolve the subject to an active user. Every
//! protected handler calls `require_auth` first.

use axum::http::HeaderMap;
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use super::session::{ACCESS_COOKIE_NAME, extract_cookie};
use super::state::AuthState;
use super::storage::fetch_user;
use super::token::{TokenKind, decode_token};
use crate::api::handlers::error::ApiError;

/// Authenticated user context derived from the access cookie.
#[derive(Clone, Debug)]
pub struct Principal {
    pub user_id: Uuid,
    pub email: String,
    pub display_name: String,
}

/// Resolve the access cookie into a principal, or return the matching 401.
pub(crate) async fn require_auth(
    headers: &HeaderMap,
    pool: &PgPool,
    state: &AuthState,
) -> Result<Principal, ApiError> {
    let Some(token) = extract_cookie(headers, ACCESS_COOKIE_NAME) else {
        return Err(ApiError::NotAuthenticated);
    };

    let claims =
        decode_token(state.config().secret_key(), &token).map_err(|_| ApiError::InvalidToken)?;
    if claims.kind != TokenKind::Access {
        return Err(ApiError::InvalidToken);
    }

    // Revocation is a negative list: if the store is down we cannot prove a
    // token was revoked, and availability wins (degrade open).
    match state.revocations().is_revoked(&claims.jti).await {
        Ok(true) => return Err(ApiError::TokenRevoked),
        Ok(false) => {}
        Err(err) => warn!("Revocation check unavailable, allowing request: {err}"),
    }

    let user_id = Uuid::parse_str(&claims.sub).map_err(|_| ApiError::InvalidToken)?;
    match fetch_user(pool, user_id).await {
        Ok(Some(user)) if user.is_active => Ok(Principal {
            user_id: user.id,
            email: user.email,
            display_name: user.display_name,
        }),
        Ok(_) => Err(ApiError::PrincipalNotFound),
        Err(err) => Err(ApiError::Internal(err)),
    }
}
