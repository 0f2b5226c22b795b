use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::security::sanitize::validate_public_url;

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct VisitPayload {
    #[validate(length(max = 45, message = "IP must be at most 45 characters"))]
    pub ip: Option<String>,

    #[validate(length(max = 512, message = "User agent must be at most 512 characters"))]
    pub user_agent: Option<String>,

    #[validate(custom(function = "validate_public_url"))]
    pub referrer: Option<String>,

    #[validate(range(min = 1, max = 999999, message = "Invalid project id"))]
    pub project_id: Option<i32>,
}

/// A validated, sanitized visit ready to be stored
#[derive(Debug, Clone, PartialEq)]
pub struct Visit {
    pub ip: String,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub project_id: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TrackResponse {
    pub status: String,
}
