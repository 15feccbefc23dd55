//! Goal summary aggregation.

use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use sqlx::PgPool;
use std::sync::Arc;

use super::storage::{GoalRecord, list_goals};
use super::types::{CategorySummary, GoalCategory, GoalSummaryResponse};
use crate::api::handlers::auth::{AuthState, principal::require_auth};
use crate::api::handlers::error::ApiError;

// Summaries read the whole collection; the cap only bounds a runaway account.
const SUMMARY_FETCH_LIMIT: i64 = 1000;

#[utoipa::path(
    get,
    path = "/api/v1/goals/summary",
    responses(
        (status = 200, description = "Aggregated progress across all goals", body = GoalSummaryResponse),
        (status = 401, description = "Missing, invalid or revoked access cookie.")
    ),
    tag = "goals"
)]
pub async fn summary(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
) -> Result<Response, ApiError> {
    let principal = require_auth(&headers, &pool, &auth_state).await?;

    let goals = list_goals(&pool, principal.user_id, None, 0, SUMMARY_FETCH_LIMIT)
        .await
        .map_err(ApiError::Internal)?;

    Ok((StatusCode::OK, Json(summarize(&goals))).into_response())
}

pub(super) fn summarize(goals: &[GoalRecord]) -> GoalSummaryResponse {
    let total_saved: f64 = goals.iter().map(|goal| goal.saved).sum();
    let total_target: f64 = goals.iter().map(|goal| goal.target).sum();
    let goals_achieved = goals.iter().filter(|goal| achieved(goal)).count();

    let by_category = GoalCategory::ALL
        .iter()
        .map(|&category| {
            let in_category: Vec<&GoalRecord> = goals
                .iter()
                .filter(|goal| goal.category == category)
                .collect();
            let saved: f64 = in_category.iter().map(|goal| goal.saved).sum();
            let target: f64 = in_category.iter().map(|goal| goal.target).sum();
            CategorySummary {
                category,
                total_saved: saved,
                total_target: target,
                progress: progress(saved, target),
                count: in_category.len(),
                achieved: in_category.iter().filter(|goal| achieved(goal)).count(),
            }
        })
        .collect();

    GoalSummaryResponse {
        total_saved,
        total_target,
        overall_progress: progress(total_saved, total_target),
        goals_achieved,
        total_goals: goals.len(),
        by_category,
    }
}

fn achieved(goal: &GoalRecord) -> bool {
    goal.saved >= goal.target
}

/// Percentage of target reached, rounded to one decimal; zero targets count
/// as zero progress rather than dividing by zero.
fn progress(saved: f64, target: f64) -> f64 {
    if target > 0.0 {
        (saved / target * 1000.0).round() / 10.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn goal(category: GoalCategory, target: f64, saved: f64) -> GoalRecord {
        GoalRecord {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "goal".to_string(),
            target,
            saved,
            icon: "🎯".to_string(),
            color: "blue".to_string(),
            category,
            description: None,
            deadline: None,
            created_at: "2026-01-01T00:00:00Z".to_string(),
            updated_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn empty_collection_summarizes_to_zero() {
        let summary = summarize(&[]);
        assert_eq!(summary.total_goals, 0);
        assert_eq!(summary.goals_achieved, 0);
        assert_eq!(summary.overall_progress, 0.0);
        assert_eq!(summary.by_category.len(), 3);
        for category in &summary.by_category {
            assert_eq!(category.count, 0);
            assert_eq!(category.progress, 0.0);
        }
    }

    #[test]
    fn overall_progress_rounds_to_one_decimal() {
        let goals = vec![
            goal(GoalCategory::Financial, 300.0, 100.0),
            goal(GoalCategory::Career, 300.0, 0.0),
        ];
        let summary = summarize(&goals);
        // 100 / 600 = 16.666... -> 16.7
        assert_eq!(summary.overall_progress, 16.7);
        assert_eq!(summary.total_saved, 100.0);
        assert_eq!(summary.total_target, 600.0);
    }

    #[test]
    fn achieved_requires_saved_at_target() {
        let goals = vec![
            goal(GoalCategory::Financial, 100.0, 100.0),
            goal(GoalCategory::Financial, 100.0, 99.0),
            goal(GoalCategory::PersonalHealth, 50.0, 75.0),
        ];
        let summary = summarize(&goals);
        assert_eq!(summary.goals_achieved, 2);
        assert_eq!(summary.total_goals, 3);
    }

    #[test]
    fn category_rollup_counts_only_that_category() {
        let goals = vec![
            goal(GoalCategory::Financial, 100.0, 50.0),
            goal(GoalCategory::Career, 200.0, 200.0),
        ];
        let summary = summarize(&goals);

        let financial = summary
            .by_category
            .iter()
            .find(|entry| entry.category == GoalCategory::Financial)
            .expect("financial rollup present");
        assert_eq!(financial.count, 1);
        assert_eq!(financial.progress, 50.0);
        assert_eq!(financial.achieved, 0);

        let career = summary
            .by_category
            .iter()
            .find(|entry| entry.category == GoalCategory::Career)
            .expect("career rollup present");
        assert_eq!(career.achieved, 1);
        assert_eq!(career.progress, 100.0);
    }
}
