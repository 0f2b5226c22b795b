use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::security::sanitize::{sanitize_optional, sanitize_text, validate_safe_text};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Skill {
    pub id: i32,
    pub name: String,
    pub category: String,
    pub proficiency: i32,
    pub icon: Option<String>,
    #[serde(rename = "order")]
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SkillInput {
    #[validate(
        length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"),
        custom(function = "validate_safe_text")
    )]
    pub name: String,

    #[validate(
        length(min = 1, max = 100, message = "Category must be between 1 and 100 characters"),
        custom(function = "validate_safe_text")
    )]
    pub category: String,

    #[validate(range(min = 1, max = 5, message = "Proficiency must be between 1 and 5"))]
    pub proficiency: i32,

    #[validate(length(max = 50, message = "Icon must be at most 50 characters"))]
    pub icon: Option<String>,

    #[serde(rename = "order", default)]
    #[validate(range(min = 0, max = 10000, message = "Order must be between 0 and 10000"))]
    pub display_order: i32,
}

impl SkillInput {
    pub fn sanitized(self) -> Self {
        Self {
            name: sanitize_text(&self.name),
            category: sanitize_text(&self.category),
            icon: sanitize_optional(self.icon),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proficiency_bounds() {
        for (value, ok) in [(0, false), (1, true), (5, true), (6, false)] {
            let skill: SkillInput = serde_json::from_value(serde_json::json!({
                "name": "Rust", "category": "Languages", "proficiency": value
            }))
            .unwrap();
            assert_eq!(skill.validate().is_ok(), ok, "proficiency {}", value);
        }
    }

    #[test]
    fn icon_length_is_capped() {
        let skill: SkillInput = serde_json::from_value(serde_json::json!({
            "name": "Rust", "category": "Languages", "proficiency": 4, "icon": "x".repeat(51)
        }))
        .unwrap();
        assert!(skill.validate().is_err());
    }
}
