//! Goal CRUD endpoints.

use axum::{
    Json,
    extract::{Extension, Path, Query},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use super::storage::{delete_goal, fetch_goal, insert_goal, list_goals, update_goal,
    update_goal_saved};
use super::types::{
    GoalCategory, GoalCreateRequest, GoalResponse, GoalUpdateRequest, SavedAmountRequest,
    validate_create, validate_update,
};
use crate::api::handlers::auth::{AuthState, principal::require_auth};
use crate::api::handlers::error::ApiError;

const DEFAULT_PAGE_SIZE: i64 = 100;
const MAX_PAGE_SIZE: i64 = 200;

#[derive(Deserialize, Debug)]
pub struct GoalListQuery {
    pub category: Option<GoalCategory>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

#[utoipa::path(
    get,
    path = "/api/v1/goals",
    params(
        ("category" = Option<String>, Query, description = "Filter by goal category"),
        ("skip" = Option<i64>, Query, description = "Rows to skip"),
        ("limit" = Option<i64>, Query, description = "Maximum rows to return (1-200)")
    ),
    responses(
        (status = 200, description = "Goals for the authenticated user", body = [GoalResponse]),
        (status = 401, description = "Missing, invalid or revoked access cookie.")
    ),
    tag = "goals"
)]
pub async fn list(
    headers: HeaderMap,
    Query(query): Query<GoalListQuery>,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
) -> Result<Response, ApiError> {
    let principal = require_auth(&headers, &pool, &auth_state).await?;

    let skip = query.skip.unwrap_or(0);
    if skip < 0 {
        return Err(ApiError::Validation("Skip must not be negative".to_string()));
    }
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE);
    if !(1..=MAX_PAGE_SIZE).contains(&limit) {
        return Err(ApiError::Validation(format!(
            "Limit must be between 1 and {MAX_PAGE_SIZE}"
        )));
    }

    let goals = list_goals(&pool, principal.user_id, query.category, skip, limit)
        .await
        .map_err(ApiError::Internal)?;
    let goals: Vec<GoalResponse> = goals.into_iter().map(GoalResponse::from).collect();
    Ok((StatusCode::OK, Json(goals)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/v1/goals",
    request_body = GoalCreateRequest,
    responses(
        (status = 201, description = "Goal created", body = GoalResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Missing, invalid or revoked access cookie.")
    ),
    tag = "goals"
)]
pub async fn create(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<GoalCreateRequest>>,
) -> Result<Response, ApiError> {
    let principal = require_auth(&headers, &pool, &auth_state).await?;

    let Some(Json(request)) = payload else {
        return Err(ApiError::Validation("Missing payload".to_string()));
    };
    validate_create(&request).map_err(ApiError::Validation)?;

    let goal = insert_goal(&pool, principal.user_id, &request)
        .await
        .map_err(ApiError::Internal)?;
    Ok((StatusCode::CREATED, Json(GoalResponse::from(goal))).into_response())
}

#[utoipa::path(
    get,
    path = "/api/v1/goals/{goal_id}",
    params(("goal_id" = String, Path, description = "Goal id")),
    responses(
        (status = 200, description = "The requested goal", body = GoalResponse),
        (status = 401, description = "Missing, invalid or revoked access cookie."),
        (status = 404, description = "Goal not found")
    ),
    tag = "goals"
)]
pub async fn get(
    Path(goal_id): Path<String>,
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
) -> Result<Response, ApiError> {
    let principal = require_auth(&headers, &pool, &auth_state).await?;
    let goal_id = parse_goal_id(&goal_id)?;

    match fetch_goal(&pool, goal_id, principal.user_id)
        .await
        .map_err(ApiError::Internal)?
    {
        Some(goal) => Ok((StatusCode::OK, Json(GoalResponse::from(goal))).into_response()),
        None => Err(ApiError::NotFound("Goal not found")),
    }
}

#[utoipa::path(
    patch,
    path = "/api/v1/goals/{goal_id}",
    params(("goal_id" = String, Path, description = "Goal id")),
    request_body = GoalUpdateRequest,
    responses(
        (status = 200, description = "Goal updated", body = GoalResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Missing, invalid or revoked access cookie."),
        (status = 404, description = "Goal not found")
    ),
    tag = "goals"
)]
pub async fn update(
    Path(goal_id): Path<String>,
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<GoalUpdateRequest>>,
) -> Result<Response, ApiError> {
    let principal = require_auth(&headers, &pool, &auth_state).await?;
    let goal_id = parse_goal_id(&goal_id)?;

    let Some(Json(request)) = payload else {
        return Err(ApiError::Validation("Missing payload".to_string()));
    };
    validate_update(&request).map_err(ApiError::Validation)?;

    match update_goal(&pool, goal_id, principal.user_id, &request)
        .await
        .map_err(ApiError::Internal)?
    {
        Some(goal) => Ok((StatusCode::OK, Json(GoalResponse::from(goal))).into_response()),
        None => Err(ApiError::NotFound("Goal not found")),
    }
}

#[utoipa::path(
    patch,
    path = "/api/v1/goals/{goal_id}/saved",
    params(("goal_id" = String, Path, description = "Goal id")),
    request_body = SavedAmountRequest,
    responses(
        (status = 200, description = "Saved amount updated (clamped to target)", body = GoalResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Missing, invalid or revoked access cookie."),
        (status = 404, description = "Goal not found")
    ),
    tag = "goals"
)]
pub async fn update_saved(
    Path(goal_id): Path<String>,
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<SavedAmountRequest>>,
) -> Result<Response, ApiError> {
    let principal = require_auth(&headers, &pool, &auth_state).await?;
    let goal_id = parse_goal_id(&goal_id)?;

    let Some(Json(request)) = payload else {
        return Err(ApiError::Validation("Missing payload".to_string()));
    };
    if request.amount < 0.0 {
        return Err(ApiError::Validation(
            "Amount must not be negative".to_string(),
        ));
    }

    match update_goal_saved(&pool, goal_id, principal.user_id, request.amount)
        .await
        .map_err(ApiError::Internal)?
    {
        Some(goal) => Ok((StatusCode::OK, Json(GoalResponse::from(goal))).into_response()),
        None => Err(ApiError::NotFound("Goal not found")),
    }
}

#[utoipa::path(
    delete,
    path = "/api/v1/goals/{goal_id}",
    params(("goal_id" = String, Path, description = "Goal id")),
    responses(
        (status = 204, description = "Goal deleted"),
        (status = 401, description = "Missing, invalid or revoked access cookie."),
        (status = 404, description = "Goal not found")
    ),
    tag = "goals"
)]
pub async fn delete(
    Path(goal_id): Path<String>,
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
) -> Result<Response, ApiError> {
    let principal = require_auth(&headers, &pool, &auth_state).await?;
    let goal_id = parse_goal_id(&goal_id)?;

    if delete_goal(&pool, goal_id, principal.user_id)
        .await
        .map_err(ApiError::Internal)?
    {
        Ok(StatusCode::NO_CONTENT.into_response())
    } else {
        Err(ApiError::NotFound("Goal not found"))
    }
}

fn parse_goal_id(goal_id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(goal_id.trim())
        .map_err(|_| ApiError::Validation("Invalid goal id".to_string()))
}
