//! Registration endpoint.

use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::Response,
};
use sqlx::PgPool;
use std::sync::Arc;

use super::{
    password::hash_password,
    rate_limit::{RateLimitDecision, RateLimiter},
    session::{issue_pair, respond_with_cookies},
    state::AuthState,
    storage::{SignupOutcome, insert_user},
    types::{RegisterRequest, UserResponse},
    utils::{extract_client_ip, valid_display_name, valid_email, valid_password},
};
use crate::api::handlers::error::ApiError;

#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created, session cookies set", body = UserResponse),
        (status = 400, description = "Validation error or email already registered"),
        (status = 429, description = "Rate limited")
    ),
    tag = "auth"
)]
pub async fn register(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<RegisterRequest>>,
) -> Result<Response, ApiError> {
    let Some(Json(request)) = payload else {
        return Err(ApiError::Validation("Missing payload".to_string()));
    };

    let email = request.email.trim().to_string();
    if !valid_email(&email) {
        return Err(ApiError::Validation("Invalid email".to_string()));
    }
    let display_name = request.display_name.trim().to_string();
    if !valid_display_name(&display_name) {
        return Err(ApiError::Validation(
            "Display name must be 1-100 characters".to_string(),
        ));
    }
    if !valid_password(&request.password) {
        return Err(ApiError::Validation(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    // Rate-limit before any hashing so abuse stays cheap to reject.
    let client_ip = extract_client_ip(&headers).unwrap_or_else(|| "unknown".to_string());
    if auth_state.rate_limiter().check(&client_ip).await == RateLimitDecision::Limited {
        return Err(ApiError::TooManyRequests);
    }

    let password_hash = hash_password(&request.password).map_err(ApiError::Internal)?;

    let user = match insert_user(&pool, &email, &display_name, &password_hash)
        .await
        .map_err(ApiError::Internal)?
    {
        SignupOutcome::Created(user) => user,
        SignupOutcome::Conflict => return Err(ApiError::DuplicateEmail),
    };

    let (access, refresh) = issue_pair(auth_state.config(), user.id)?;
    respond_with_cookies(
        StatusCode::CREATED,
        auth_state.config(),
        &access,
        &refresh,
        UserResponse::from(user),
    )
}
