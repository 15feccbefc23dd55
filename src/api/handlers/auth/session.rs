//! Session issuance, cookie transport, logout and refresh.
//!
//! Flow Overview:
//! 1) Issue an access/refresh token pair with distinct lifetimes.
//! 2) Transport both in `HttpOnly` cookies with fixed names and paths.
//! 3) On logout, blacklist the access token's `jti` for its remaining
//!    lifetime and clear both cookies.
//! 4) On refresh, rotate the pair and blacklist the old refresh `jti`.

use axum::{
    Json,
    extract::Extension,
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{InvalidHeaderValue, SET_COOKIE},
    },
    response::{IntoResponse, Response},
};
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{error, warn};
use uuid::Uuid;

use super::{
    state::{AuthConfig, AuthState},
    storage::fetch_user,
    token::{IssuedToken, TokenKind, decode_token, encode_token, now_unix},
    types::MessageResponse,
};
use crate::api::handlers::error::ApiError;

// The CDN in front of the API forwards only allow-listed cookie names to the
// origin and strips the rest; "__session" is the one name on that list.
pub(crate) const ACCESS_COOKIE_NAME: &str = "__session";
// The refresh cookie is path-scoped to the refresh endpoint so it never rides
// along on ordinary API calls.
pub(crate) const REFRESH_COOKIE_NAME: &str = "refresh_token";
pub(crate) const REFRESH_COOKIE_PATH: &str = "/api/v1/auth/refresh";

/// Issue a fresh access/refresh token pair for `user_id`.
pub(super) fn issue_pair(
    config: &AuthConfig,
    user_id: Uuid,
) -> Result<(IssuedToken, IssuedToken), ApiError> {
    let access = encode_token(
        config.secret_key(),
        user_id,
        TokenKind::Access,
        config.access_ttl_seconds(),
    )
    .map_err(|err| ApiError::Internal(anyhow::anyhow!("failed to sign access token: {err}")))?;
    let refresh = encode_token(
        config.secret_key(),
        user_id,
        TokenKind::Refresh,
        config.refresh_ttl_seconds(),
    )
    .map_err(|err| ApiError::Internal(anyhow::anyhow!("failed to sign refresh token: {err}")))?;
    Ok((access, refresh))
}

fn build_cookie(
    name: &str,
    value: &str,
    path: &str,
    max_age: i64,
    secure: bool,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie =
        format!("{name}={value}; Path={path}; HttpOnly; SameSite=Lax; Max-Age={max_age}");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

pub(super) fn set_session_cookies(
    headers: &mut HeaderMap,
    config: &AuthConfig,
    access: &IssuedToken,
    refresh: &IssuedToken,
) -> Result<(), InvalidHeaderValue> {
    headers.append(
        SET_COOKIE,
        build_cookie(
            ACCESS_COOKIE_NAME,
            &access.token,
            "/",
            config.access_ttl_seconds(),
            config.cookie_secure(),
        )?,
    );
    headers.append(
        SET_COOKIE,
        build_cookie(
            REFRESH_COOKIE_NAME,
            &refresh.token,
            REFRESH_COOKIE_PATH,
            config.refresh_ttl_seconds(),
            config.cookie_secure(),
        )?,
    );
    Ok(())
}

/// Deletion must reuse the exact name+path pair used when setting; cookie
/// jars treat a mismatched path as a different cookie.
pub(super) fn clear_session_cookies(
    headers: &mut HeaderMap,
    config: &AuthConfig,
) -> Result<(), InvalidHeaderValue> {
    headers.append(
        SET_COOKIE,
        build_cookie(ACCESS_COOKIE_NAME, "", "/", 0, config.cookie_secure())?,
    );
    headers.append(
        SET_COOKIE,
        build_cookie(
            REFRESH_COOKIE_NAME,
            "",
            REFRESH_COOKIE_PATH,
            0,
            config.cookie_secure(),
        )?,
    );
    Ok(())
}

pub(crate) fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let header = headers.get(axum::http::header::COOKIE)?;
    let value = header.to_str().ok()?;
    for pair in value.split(';') {
        let trimmed = pair.trim();
        let mut parts = trimmed.splitn(2, '=');
        let key = parts.next()?.trim();
        let val = parts.next()?.trim();
        if key == name {
            return Some(val.to_string());
        }
    }
    None
}

/// Build a response with both session cookies attached.
pub(super) fn respond_with_cookies<T: Serialize>(
    status: StatusCode,
    config: &AuthConfig,
    access: &IssuedToken,
    refresh: &IssuedToken,
    body: T,
) -> Result<Response, ApiError> {
    let mut headers = HeaderMap::new();
    set_session_cookies(&mut headers, config, access, refresh)
        .map_err(|err| ApiError::Internal(anyhow::anyhow!("failed to build cookies: {err}")))?;
    Ok((status, headers, Json(body)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses(
        (status = 200, description = "Session revoked and cookies cleared", body = MessageResponse)
    ),
    tag = "auth"
)]
pub async fn logout(headers: HeaderMap, auth_state: Extension<Arc<AuthState>>) -> Response {
    // Logout always succeeds; a missing or garbage cookie still clears state.
    if let Some(token) = extract_cookie(&headers, ACCESS_COOKIE_NAME) {
        if let Ok(claims) = decode_token(auth_state.config().secret_key(), &token) {
            let remaining = claims.remaining_seconds(now_unix());
            if remaining > 0 {
                if let Err(err) = auth_state.revocations().revoke(&claims.jti, remaining).await {
                    error!("Failed to record revocation on logout: {err}");
                }
            }
        }
    }

    let mut response_headers = HeaderMap::new();
    if let Err(err) = clear_session_cookies(&mut response_headers, auth_state.config()) {
        error!("Failed to build clearing cookies: {err}");
    }
    (
        StatusCode::OK,
        response_headers,
        Json(MessageResponse {
            message: "Logged out successfully".to_string(),
        }),
    )
        .into_response()
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/refresh",
    responses(
        (status = 200, description = "Token pair rotated", body = MessageResponse),
        (status = 401, description = "Missing, invalid, wrong-type or revoked refresh token")
    ),
    tag = "auth"
)]
pub async fn refresh(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
) -> Result<Response, ApiError> {
    let Some(token) = extract_cookie(&headers, REFRESH_COOKIE_NAME) else {
        return Err(ApiError::NotAuthenticated);
    };
    let claims = decode_token(auth_state.config().secret_key(), &token)
        .map_err(|_| ApiError::InvalidToken)?;
    if claims.kind != TokenKind::Refresh {
        return Err(ApiError::InvalidToken);
    }
    match auth_state.revocations().is_revoked(&claims.jti).await {
        Ok(true) => return Err(ApiError::TokenRevoked),
        Ok(false) => {}
        Err(err) => warn!("Revocation check unavailable, allowing refresh: {err}"),
    }

    let user_id = Uuid::parse_str(&claims.sub).map_err(|_| ApiError::InvalidToken)?;
    let user = fetch_user(&pool, user_id).await.map_err(ApiError::Internal)?;
    let Some(user) = user else {
        return Err(ApiError::PrincipalNotFound);
    };
    if !user.is_active {
        return Err(ApiError::PrincipalNotFound);
    }

    // Rotation blacklists the old refresh token: a stolen copy dies here
    // instead of staying valid until natural expiry. Best effort only; a
    // store failure degrades open.
    let remaining = claims.remaining_seconds(now_unix());
    if remaining > 0 {
        if let Err(err) = auth_state.revocations().revoke(&claims.jti, remaining).await {
            warn!("Failed to revoke rotated refresh token: {err}");
        }
    }

    let (access, refresh) = issue_pair(auth_state.config(), user.id)?;
    respond_with_cookies(
        StatusCode::OK,
        auth_state.config(),
        &access,
        &refresh,
        MessageResponse {
            message: "Token refreshed".to_string(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn test_config() -> AuthConfig {
        AuthConfig::new(SecretString::from("0123456789abcdef0123456789abcdef"))
    }

    fn issued(token: &str) -> IssuedToken {
        IssuedToken {
            token: token.to_string(),
            jti: "jti".to_string(),
            expires_at: 0,
        }
    }

    #[test]
    fn access_cookie_format() -> Result<(), InvalidHeaderValue> {
        let mut headers = HeaderMap::new();
        set_session_cookies(&mut headers, &test_config(), &issued("aaa"), &issued("rrr"))?;

        let cookies: Vec<_> = headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .collect();
        assert_eq!(cookies.len(), 2);
        assert_eq!(
            cookies[0],
            "__session=aaa; Path=/; HttpOnly; SameSite=Lax; Max-Age=1800"
        );
        assert_eq!(
            cookies[1],
            "refresh_token=rrr; Path=/api/v1/auth/refresh; HttpOnly; SameSite=Lax; Max-Age=604800"
        );
        Ok(())
    }

    #[test]
    fn production_cookies_are_secure() -> Result<(), InvalidHeaderValue> {
        let config = test_config().with_production(true);
        let mut headers = HeaderMap::new();
        set_session_cookies(&mut headers, &config, &issued("aaa"), &issued("rrr"))?;

        for value in headers.get_all(SET_COOKIE) {
            let cookie = value.to_str().unwrap_or_default();
            assert!(cookie.ends_with("; Secure"), "missing Secure: {cookie}");
        }
        Ok(())
    }

    #[test]
    fn clearing_matches_name_and_path() -> Result<(), InvalidHeaderValue> {
        let mut headers = HeaderMap::new();
        clear_session_cookies(&mut headers, &test_config())?;

        let cookies: Vec<_> = headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .collect();
        assert_eq!(
            cookies[0],
            "__session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0"
        );
        assert_eq!(
            cookies[1],
            "refresh_token=; Path=/api/v1/auth/refresh; HttpOnly; SameSite=Lax; Max-Age=0"
        );
        Ok(())
    }

    #[test]
    fn extract_cookie_finds_named_value() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::COOKIE,
            HeaderValue::from_static("other=1; __session=token-value; refresh_token=r"),
        );
        assert_eq!(
            extract_cookie(&headers, ACCESS_COOKIE_NAME),
            Some("token-value".to_string())
        );
        assert_eq!(
            extract_cookie(&headers, REFRESH_COOKIE_NAME),
            Some("r".to_string())
        );
        assert_eq!(extract_cookie(&headers, "missing"), None);
    }

    #[test]
    fn extract_cookie_none_without_header() {
        let headers = HeaderMap::new();
        assert_eq!(extract_cookie(&headers, ACCESS_COOKIE_NAME), None);
    }
}
