//! Authenticated profile endpoint.

use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use sqlx::PgPool;
use std::sync::Arc;

use super::{principal::require_auth, state::AuthState, storage::fetch_user, types::UserResponse};
use crate::api::handlers::error::ApiError;

#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Return the authenticated user.", body = UserResponse),
        (status = 401, description = "Missing, invalid or revoked access cookie.")
    ),
    tag = "auth"
)]
pub async fn me(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
) -> Result<Response, ApiError> {
    let principal = require_auth(&headers, &pool, &auth_state).await?;

    // The principal carries identity; the row is fetched again only for the
    // projection fields the token does not carry.
    match fetch_user(&pool, principal.user_id)
        .await
        .map_err(ApiError::Internal)?
    {
        Some(user) => {
            let response = UserResponse {
                id: principal.user_id.to_string(),
                email: principal.email,
                display_name: principal.display_name,
                created_at: user.created_at,
            };
            Ok((StatusCode::OK, Json(response)).into_response())
        }
        None => Err(ApiError::PrincipalNotFound),
    }
}
