//! Database helpers for the goal collection.
//!
//! Every query is scoped by `user_id`; a goal owned by another user is
//! indistinguishable from a missing one.

use anyhow::{Context, Result, anyhow};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::Instrument;
use uuid::Uuid;

use super::types::{GoalCategory, GoalCreateRequest, GoalUpdateRequest};

pub(crate) struct GoalRecord {
    pub(crate) id: Uuid,
    pub(crate) user_id: Uuid,
    pub(crate) title: String,
    pub(crate) target: f64,
    pub(crate) saved: f64,
    pub(crate) icon: String,
    pub(crate) color: String,
    pub(crate) category: GoalCategory,
    pub(crate) description: Option<String>,
    pub(crate) deadline: Option<String>,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

// Money columns are NUMERIC in the schema; read them back as float8 and keep
// timestamps as ISO strings so the wire format never depends on driver types.
const GOAL_PROJECTION: &str = r#"
    id,
    user_id,
    title,
    target::float8 AS target,
    saved::float8 AS saved,
    icon,
    color,
    category::text AS category,
    description,
    deadline,
    to_char(created_at AT TIME ZONE 'utc', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS created_at,
    to_char(updated_at AT TIME ZONE 'utc', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS updated_at
"#;

pub(super) async fn list_goals(
    pool: &PgPool,
    user_id: Uuid,
    category: Option<GoalCategory>,
    skip: i64,
    limit: i64,
) -> Result<Vec<GoalRecord>> {
    let query = format!(
        r"
        SELECT {GOAL_PROJECTION}
        FROM goals
        WHERE user_id = $1 AND ($2::text IS NULL OR category::text = $2)
        ORDER BY created_at DESC
        OFFSET $3 LIMIT $4
    "
    );
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query.as_str()
    );
    let rows = sqlx::query(&query)
        .bind(user_id)
        .bind(category.map(GoalCategory::as_str))
        .bind(skip)
        .bind(limit)
        .fetch_all(pool)
        .instrument(span)
        .await
        .context("failed to list goals")?;

    rows.iter().map(goal_from_row).collect()
}

pub(super) async fn fetch_goal(
    pool: &PgPool,
    goal_id: Uuid,
    user_id: Uuid,
) -> Result<Option<GoalRecord>> {
    let query = format!("SELECT {GOAL_PROJECTION} FROM goals WHERE id = $1 AND user_id = $2");
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query.as_str()
    );
    let row = sqlx::query(&query)
        .bind(goal_id)
        .bind(user_id)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to fetch goal")?;

    row.as_ref().map(goal_from_row).transpose()
}

pub(super) async fn insert_goal(
    pool: &PgPool,
    user_id: Uuid,
    request: &GoalCreateRequest,
) -> Result<GoalRecord> {
    let query = format!(
        r"
        INSERT INTO goals
            (user_id, title, target, saved, icon, color, category, description, deadline)
        VALUES ($1, $2, $3::float8, $4::float8, $5, $6, $7::text::goal_category, $8, $9)
        RETURNING {GOAL_PROJECTION}
    "
    );
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query.as_str()
    );
    let row = sqlx::query(&query)
        .bind(user_id)
        .bind(&request.title)
        .bind(request.target)
        .bind(request.saved)
        .bind(&request.icon)
        .bind(&request.color)
        .bind(request.category.as_str())
        .bind(&request.description)
        .bind(&request.deadline)
        .fetch_one(pool)
        .instrument(span)
        .await
        .context("failed to insert goal")?;

    goal_from_row(&row)
}

pub(super) async fn update_goal(
    pool: &PgPool,
    goal_id: Uuid,
    user_id: Uuid,
    request: &GoalUpdateRequest,
) -> Result<Option<GoalRecord>> {
    let query = format!(
        r"
        UPDATE goals
        SET
            title = COALESCE($1, title),
            target = COALESCE($2::float8::numeric, target),
            saved = COALESCE($3::float8::numeric, saved),
            icon = COALESCE($4, icon),
            color = COALESCE($5, color),
            category = COALESCE($6::text::goal_category, category),
            description = COALESCE($7, description),
            deadline = COALESCE($8, deadline),
            updated_at = NOW()
        WHERE id = $9 AND user_id = $10
        RETURNING {GOAL_PROJECTION}
    "
    );
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query.as_str()
    );
    let row = sqlx::query(&query)
        .bind(&request.title)
        .bind(request.target)
        .bind(request.saved)
        .bind(&request.icon)
        .bind(&request.color)
        .bind(request.category.map(GoalCategory::as_str))
        .bind(&request.description)
        .bind(&request.deadline)
        .bind(goal_id)
        .bind(user_id)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to update goal")?;

    row.as_ref().map(goal_from_row).transpose()
}

/// Set the saved amount, clamped so it never exceeds the target.
pub(super) async fn update_goal_saved(
    pool: &PgPool,
    goal_id: Uuid,
    user_id: Uuid,
    amount: f64,
) -> Result<Option<GoalRecord>> {
    let query = format!(
        r"
        UPDATE goals
        SET saved = LEAST($1::float8::numeric, target), updated_at = NOW()
        WHERE id = $2 AND user_id = $3
        RETURNING {GOAL_PROJECTION}
    "
    );
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query.as_str()
    );
    let row = sqlx::query(&query)
        .bind(amount)
        .bind(goal_id)
        .bind(user_id)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to update saved amount")?;

    row.as_ref().map(goal_from_row).transpose()
}

pub(super) async fn delete_goal(pool: &PgPool, goal_id: Uuid, user_id: Uuid) -> Result<bool> {
    let query = "DELETE FROM goals WHERE id = $1 AND user_id = $2";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "DELETE",
        db.statement = query
    );
    let result = sqlx::query(query)
        .bind(goal_id)
        .bind(user_id)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to delete goal")?;

    Ok(result.rows_affected() > 0)
}

fn goal_from_row(row: &PgRow) -> Result<GoalRecord> {
    let category: String = row.get("category");
    let category = GoalCategory::parse(&category)
        .ok_or_else(|| anyhow!("unknown goal category: {category}"))?;

    Ok(GoalRecord {
        id: row.get("id"),
        user_id: row.get("user_id"),
        title: row.get("title"),
        target: row.get("target"),
        saved: row.get("saved"),
        icon: row.get("icon"),
        color: row.get("color"),
        category,
        description: row.get("description"),
        deadline: row.get("deadline"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}
