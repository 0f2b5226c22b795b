use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::security::sanitize::{
    sanitize_list, sanitize_optional, sanitize_text, validate_public_url, validate_safe_text,
    validate_technologies,
};

// ───── Database Models ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    pub id: i32,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub project_type: String,
    pub technologies: Vec<String>,
    pub github_url: Option<String>,
    pub live_url: Option<String>,
    pub video_url: Option<String>,
    pub featured: bool,
    pub active: bool,
    #[serde(rename = "order")]
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ───── Input & Validation ───────────────────────────────────────────

/// Body of `POST /projects` and `PUT /projects/{id}`; an update replaces every field
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProjectInput {
    #[validate(
        length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"),
        custom(function = "validate_safe_text")
    )]
    pub title: String,

    #[validate(
        length(min = 1, max = 5000, message = "Description must be between 1 and 5000 characters"),
        custom(function = "validate_safe_text")
    )]
    pub description: String,

    #[serde(rename = "type", default = "default_project_type")]
    #[validate(length(min = 1, max = 100, message = "Type must be between 1 and 100 characters"))]
    pub project_type: String,

    #[serde(default)]
    #[validate(custom(function = "validate_technologies"))]
    pub technologies: Vec<String>,

    #[validate(custom(function = "validate_public_url"))]
    pub github_url: Option<String>,

    #[validate(custom(function = "validate_public_url"))]
    pub live_url: Option<String>,

    #[validate(custom(function = "validate_public_url"))]
    pub video_url: Option<String>,

    #[serde(default)]
    pub featured: bool,

    #[serde(default = "default_active")]
    pub active: bool,

    #[serde(rename = "order", default)]
    #[validate(range(min = 0, max = 10000, message = "Order must be between 0 and 10000"))]
    pub display_order: i32,
}

fn default_project_type() -> String {
    "web".to_string()
}

fn default_active() -> bool {
    true
}

impl ProjectInput {
    /// Strips markup and control characters once validation has passed
    pub fn sanitized(self) -> Self {
        Self {
            title: sanitize_text(&self.title),
            description: sanitize_text(&self.description),
            project_type: sanitize_text(&self.project_type),
            technologies: sanitize_list(self.technologies),
            github_url: trim_url(self.github_url),
            live_url: trim_url(self.live_url),
            video_url: trim_url(self.video_url),
            ..self
        }
    }
}

fn trim_url(url: Option<String>) -> Option<String> {
    sanitize_optional(url.map(|u| u.trim().to_string()))
}

// ───── API Response Models ──────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct AdminProjectsResponse {
    pub projects: Vec<Project>,
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
}

impl From<Vec<Project>> for AdminProjectsResponse {
    fn from(projects: Vec<Project>) -> Self {
        let active = projects.iter().filter(|p| p.active).count();
        let total = projects.len();
        Self {
            projects,
            total,
            active,
            inactive: total - active,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ProjectStats {
    pub total: i64,
    pub active: i64,
    pub inactive: i64,
    pub active_percentage: f64,
}

impl ProjectStats {
    pub fn from_counts(total: i64, active: i64) -> Self {
        let active_percentage = if total > 0 {
            (active as f64 / total as f64 * 10000.0).round() / 100.0
        } else {
            0.0
        };
        Self {
            total,
            active,
            inactive: total - active,
            active_percentage,
        }
    }
}
