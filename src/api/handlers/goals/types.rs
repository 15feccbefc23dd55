//! Request/response types and validation for goal endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::storage::GoalRecord;

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GoalCategory {
    Financial,
    Career,
    PersonalHealth,
}

impl GoalCategory {
    pub(super) const ALL: [Self; 3] = [Self::Financial, Self::Career, Self::PersonalHealth];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Financial => "financial",
            Self::Career => "career",
            Self::PersonalHealth => "personal_health",
        }
    }

    pub(super) fn parse(value: &str) -> Option<Self> {
        match value {
            "financial" => Some(Self::Financial),
            "career" => Some(Self::Career),
            "personal_health" => Some(Self::PersonalHealth),
            _ => None,
        }
    }
}

fn default_icon() -> String {
    "🎯".to_string()
}

fn default_color() -> String {
    "blue".to_string()
}

const fn default_category() -> GoalCategory {
    GoalCategory::Financial
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct GoalCreateRequest {
    pub title: String,
    pub target: f64,
    #[serde(default)]
    pub saved: f64,
    #[serde(default = "default_icon")]
    pub icon: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_category")]
    pub category: GoalCategory,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub deadline: Option<String>,
}

/// Partial update; absent fields are left unchanged.
#[derive(ToSchema, Serialize, Deserialize, Debug, Default)]
pub struct GoalUpdateRequest {
    pub title: Option<String>,
    pub target: Option<f64>,
    pub saved: Option<f64>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub category: Option<GoalCategory>,
    pub description: Option<String>,
    pub deadline: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SavedAmountRequest {
    pub amount: f64,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct GoalResponse {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub target: f64,
    pub saved: f64,
    pub icon: String,
    pub color: String,
    pub category: GoalCategory,
    pub description: Option<String>,
    pub deadline: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<GoalRecord> for GoalResponse {
    fn from(record: GoalRecord) -> Self {
        Self {
            id: record.id.to_string(),
            user_id: record.user_id.to_string(),
            title: record.title,
            target: record.target,
            saved: record.saved,
            icon: record.icon,
            color: record.color,
            category: record.category,
            description: record.description,
            deadline: record.deadline,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct CategorySummary {
    pub category: GoalCategory,
    pub total_saved: f64,
    pub total_target: f64,
    pub progress: f64,
    pub count: usize,
    pub achieved: usize,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct GoalSummaryResponse {
    pub total_saved: f64,
    pub total_target: f64,
    pub overall_progress: f64,
    pub goals_achieved: usize,
    pub total_goals: usize,
    pub by_category: Vec<CategorySummary>,
}

pub(super) fn validate_create(request: &GoalCreateRequest) -> Result<(), String> {
    validate_title(&request.title)?;
    if request.target <= 0.0 {
        return Err("Target must be greater than zero".to_string());
    }
    if request.saved < 0.0 {
        return Err("Saved amount must not be negative".to_string());
    }
    validate_cosmetics(Some(&request.icon), Some(&request.color))?;
    validate_deadline(request.deadline.as_deref())
}

pub(super) fn validate_update(request: &GoalUpdateRequest) -> Result<(), String> {
    if let Some(title) = &request.title {
        validate_title(title)?;
    }
    if let Some(target) = request.target {
        if target <= 0.0 {
            return Err("Target must be greater than zero".to_string());
        }
    }
    if let Some(saved) = request.saved {
        if saved < 0.0 {
            return Err("Saved amount must not be negative".to_string());
        }
    }
    validate_cosmetics(request.icon.as_deref(), request.color.as_deref())?;
    validate_deadline(request.deadline.as_deref())
}

fn validate_title(title: &str) -> Result<(), String> {
    let length = title.chars().count();
    if (1..=255).contains(&length) {
        Ok(())
    } else {
        Err("Title must be 1-255 characters".to_string())
    }
}

fn validate_cosmetics(icon: Option<&str>, color: Option<&str>) -> Result<(), String> {
    if icon.is_some_and(|icon| icon.chars().count() > 10) {
        return Err("Icon must be at most 10 characters".to_string());
    }
    if color.is_some_and(|color| color.chars().count() > 30) {
        return Err("Color must be at most 30 characters".to_string());
    }
    Ok(())
}

fn validate_deadline(deadline: Option<&str>) -> Result<(), String> {
    if deadline.is_some_and(|deadline| deadline.chars().count() > 20) {
        return Err("Deadline must be at most 20 characters".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_request() -> GoalCreateRequest {
        GoalCreateRequest {
            title: "Emergency fund".to_string(),
            target: 1000.0,
            saved: 0.0,
            icon: default_icon(),
            color: default_color(),
            category: default_category(),
            description: None,
            deadline: None,
        }
    }

    #[test]
    fn category_round_trips_snake_case() -> anyhow::Result<()> {
        let json = serde_json::to_string(&GoalCategory::PersonalHealth)?;
        assert_eq!(json, "\"personal_health\"");
        let decoded: GoalCategory = serde_json::from_str("\"career\"")?;
        assert_eq!(decoded, GoalCategory::Career);
        assert_eq!(GoalCategory::parse("financial"), Some(GoalCategory::Financial));
        assert_eq!(GoalCategory::parse("unknown"), None);
        Ok(())
    }

    #[test]
    fn create_defaults_applied() -> anyhow::Result<()> {
        let request: GoalCreateRequest =
            serde_json::from_str(r#"{"title": "Run a marathon", "target": 42.0}"#)?;
        assert_eq!(request.icon, "🎯");
        assert_eq!(request.color, "blue");
        assert_eq!(request.category, GoalCategory::Financial);
        assert_eq!(request.saved, 0.0);
        Ok(())
    }

    #[test]
    fn validate_create_accepts_defaults() {
        assert!(validate_create(&create_request()).is_ok());
    }

    #[test]
    fn validate_create_bounds() {
        let mut request = create_request();
        request.title = String::new();
        assert!(validate_create(&request).is_err());

        let mut request = create_request();
        request.target = 0.0;
        assert!(validate_create(&request).is_err());

        let mut request = create_request();
        request.saved = -1.0;
        assert!(validate_create(&request).is_err());

        let mut request = create_request();
        request.icon = "x".repeat(11);
        assert!(validate_create(&request).is_err());

        let mut request = create_request();
        request.deadline = Some("x".repeat(21));
        assert!(validate_create(&request).is_err());
    }

    #[test]
    fn validate_update_ignores_absent_fields() {
        assert!(validate_update(&GoalUpdateRequest::default()).is_ok());

        let request = GoalUpdateRequest {
            target: Some(-5.0),
            ..GoalUpdateRequest::default()
        };
        assert!(validate_update(&request).is_err());

        let request = GoalUpdateRequest {
            color: Some("x".repeat(31)),
            ..GoalUpdateRequest::default()
        };
        assert!(validate_update(&request).is_err());
    }
}
