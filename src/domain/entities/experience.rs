use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::security::sanitize::{sanitize_list, sanitize_text, validate_safe_text, validate_technologies};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Experience {
    pub id: i32,
    pub title: String,
    pub company: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub current: bool,
    pub description: String,
    pub technologies: Vec<String>,
    #[serde(rename = "order")]
    pub display_order: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_experience_dates"))]
pub struct ExperienceInput {
    #[validate(
        length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"),
        custom(function = "validate_safe_text")
    )]
    pub title: String,

    #[validate(
        length(min = 1, max = 255, message = "Company must be between 1 and 255 characters"),
        custom(function = "validate_safe_text")
    )]
    pub company: String,

    pub start_date: NaiveDate,

    pub end_date: Option<NaiveDate>,

    #[serde(default)]
    pub current: bool,

    #[validate(
        length(min = 1, max = 5000, message = "Description must be between 1 and 5000 characters"),
        custom(function = "validate_safe_text")
    )]
    pub description: String,

    #[serde(default)]
    #[validate(custom(function = "validate_technologies"))]
    pub technologies: Vec<String>,

    #[serde(rename = "order", default)]
    #[validate(range(min = 0, max = 10000, message = "Order must be between 0 and 10000"))]
    pub display_order: i32,

    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

fn validate_experience_dates(input: &ExperienceInput) -> Result<(), ValidationError> {
    if let Some(end) = input.end_date {
        if end < input.start_date {
            let mut err = ValidationError::new("invalid_date_range");
            err.message = Some("End date cannot be before start date".into());
            return Err(err);
        }
        if input.current {
            let mut err = ValidationError::new("current_with_end_date");
            err.message = Some("A current position cannot have an end date".into());
            return Err(err);
        }
    }
    Ok(())
}

impl ExperienceInput {
    pub fn sanitized(self) -> Self {
        Self {
            title: sanitize_text(&self.title),
            company: sanitize_text(&self.company),
            description: sanitize_text(&self.description),
            technologies: sanitize_list(self.technologies),
            ..self
        }
    }
}
