use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::{Validate, ValidationError};

use crate::security::sanitize::{
    sanitize_optional, sanitize_text, validate_content_key, validate_public_url, validate_safe_text,
};

// ───── Database Models ───────────────────────────────────────────────

/// Generic key/value row backing the about, contact and other static pages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ContentEntry {
    pub id: i32,
    pub key: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub content_type: String,
    pub value: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ContentInput {
    #[validate(
        length(min = 1, max = 100, message = "Key must be between 1 and 100 characters"),
        custom(function = "validate_content_key")
    )]
    pub key: String,

    #[serde(rename = "type")]
    #[validate(
        length(min = 1, max = 100, message = "Type must be between 1 and 100 characters"),
        custom(function = "validate_safe_text")
    )]
    pub content_type: String,

    #[validate(custom(function = "validate_json_value"))]
    pub value: Value,
}

const MAX_CONTENT_BYTES: usize = 64 * 1024;

fn validate_json_value(value: &Value) -> Result<(), ValidationError> {
    if value.is_null() {
        let mut err = ValidationError::new("missing_value");
        err.message = Some("Value is required".into());
        return Err(err);
    }
    if value.to_string().len() > MAX_CONTENT_BYTES {
        let mut err = ValidationError::new("value_too_large");
        err.message = Some("Value must be at most 64 KiB".into());
        return Err(err);
    }
    Ok(())
}

impl ContentInput {
    pub fn sanitized(self) -> Self {
        Self {
            content_type: sanitize_text(&self.content_type),
            value: sanitize_value(self.value),
            ..self
        }
    }
}

/// Applies text sanitization to every string nested inside a JSON document
pub fn sanitize_value(value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(sanitize_text(&s)),
        Value::Array(items) => Value::Array(items.into_iter().map(sanitize_value).collect()),
        Value::Object(map) => Value::Object(map.into_iter().map(|(k, v)| (k, sanitize_value(v))).collect()),
        other => other,
    }
}

// ───── Page Documents ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Highlight {
    #[validate(length(max = 50, message = "Icon must be at most 50 characters"))]
    #[serde(default)]
    pub icon: String,

    #[validate(
        length(min = 1, max = 500, message = "Highlight text must be between 1 and 500 characters"),
        custom(function = "validate_safe_text")
    )]
    pub text: String,
}

/// Stored under the `about` content key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct AboutData {
    #[validate(
        length(min = 1, max = 5000, message = "Description must be between 1 and 5000 characters"),
        custom(function = "validate_safe_text")
    )]
    pub description: String,

    #[serde(default)]
    #[validate(nested)]
    pub highlights: Vec<Highlight>,
}

impl AboutData {
    pub fn sanitized(self) -> Self {
        Self {
            description: sanitize_text(&self.description),
            highlights: self
                .highlights
                .into_iter()
                .map(|h| Highlight {
                    icon: sanitize_text(&h.icon),
                    text: sanitize_text(&h.text),
                })
                .collect(),
        }
    }
}

/// Stored under the `contact` content key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ContactData {
    #[validate(
        email(message = "Email must be a valid address"),
        length(max = 254, message = "Email must be at most 254 characters")
    )]
    pub email: String,

    #[serde(default)]
    #[validate(length(max = 255, message = "Location must be at most 255 characters"), custom(function = "validate_safe_text"))]
    pub location: String,

    #[validate(custom(function = "validate_public_url"))]
    pub linkedin: Option<String>,

    #[validate(custom(function = "validate_public_url"))]
    pub github: Option<String>,

    #[serde(default)]
    #[validate(length(max = 255, message = "Availability must be at most 255 characters"), custom(function = "validate_safe_text"))]
    pub availability: String,
}

impl ContactData {
    pub fn sanitized(self) -> Self {
        Self {
            email: self.email.trim().to_string(),
            location: sanitize_text(&self.location),
            linkedin: sanitize_optional(self.linkedin),
            github: sanitize_optional(self.github),
            availability: sanitize_text(&self.availability),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_strings_are_sanitized() {
        let cleaned = sanitize_value(json!({
            "title": "<b>Hi</b>",
            "items": ["<script>x</script>ok", 3]
        }));
        assert_eq!(cleaned, json!({"title": "Hi", "items": ["ok", 3]}));
    }

    #[test]
    fn content_requires_value() {
        let input: ContentInput = serde_json::from_value(json!({
            "key": "hero", "type": "page", "value": null
        }))
        .unwrap();
        assert!(input.validate().is_err());
    }

    #[test]
    fn contact_email_is_checked() {
        let contact: ContactData = serde_json::from_value(json!({
            "email": "not-an-email", "location": "Lagos"
        }))
        .unwrap();
        assert!(contact.validate().is_err());
    }

    #[test]
    fn about_highlights_are_validated() {
        let about: AboutData = serde_json::from_value(json!({
            "description": "Backend developer",
            "highlights": [{"icon": "rocket", "text": ""}]
        }))
        .unwrap();
        assert!(about.validate().is_err());
    }
}
