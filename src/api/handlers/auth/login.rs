//! Login endpoint.

use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::Response,
};
use sqlx::PgPool;
use std::sync::Arc;

use super::{
    password::verify_password,
    rate_limit::{RateLimitDecision, RateLimiter},
    session::{issue_pair, respond_with_cookies},
    state::AuthState,
    storage::lookup_user_by_email,
    types::{LoginRequest, UserResponse},
    utils::extract_client_ip,
};
use crate::api::handlers::error::ApiError;

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Credentials verified, session cookies set", body = UserResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 403, description = "Account is disabled"),
        (status = 429, description = "Rate limited")
    ),
    tag = "auth"
)]
pub async fn login(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<LoginRequest>>,
) -> Result<Response, ApiError> {
    let Some(Json(request)) = payload else {
        return Err(ApiError::Validation("Missing payload".to_string()));
    };

    let client_ip = extract_client_ip(&headers).unwrap_or_else(|| "unknown".to_string());
    if auth_state.rate_limiter().check(&client_ip).await == RateLimitDecision::Limited {
        return Err(ApiError::TooManyRequests);
    }

    let email = request.email.trim();
    let user = lookup_user_by_email(&pool, email)
        .await
        .map_err(ApiError::Internal)?;

    // Unknown email and wrong password collapse into one answer so the
    // endpoint cannot be used to probe for accounts.
    let Some(user) = user else {
        return Err(ApiError::InvalidCredentials);
    };
    if !verify_password(&request.password, &user.password_hash) {
        return Err(ApiError::InvalidCredentials);
    }
    if !user.is_active {
        return Err(ApiError::AccountDisabled);
    }

    let (access, refresh) = issue_pair(auth_state.config(), user.id)?;
    respond_with_cookies(
        StatusCode::OK,
        auth_state.config(),
        &access,
        &refresh,
        UserResponse::from(user),
    )
}
