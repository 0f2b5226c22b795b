use std::time::Duration;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

pub static START_TIME: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);

// ───── Cache Keys ───────────────────────────────────────────────────

pub const CACHE_KEY_PROJECTS: &str = "projects";
pub const CACHE_KEY_SKILLS: &str = "skills";
pub const CACHE_KEY_EXPERIENCES: &str = "experiences";
pub const CACHE_KEY_ABOUT: &str = "about";
pub const CACHE_KEY_CONTACT: &str = "contact";
pub const CACHE_KEY_CONTENT_ALL: &str = "content:all";
pub const CACHE_KEY_CONTENT_TYPE_PREFIX: &str = "content:type:";

// ───── Cache TTLs ───────────────────────────────────────────────────

pub const LIST_CACHE_TTL: Duration = Duration::from_secs(5 * 60);
pub const PAGE_CACHE_TTL: Duration = Duration::from_secs(10 * 60);

// ───── Content Keys ─────────────────────────────────────────────────

pub const CONTENT_KEY_ABOUT: &str = "about";
pub const CONTENT_KEY_CONTACT: &str = "contact";
pub const CONTENT_TYPE_PAGE: &str = "page";

// ───── Chat ─────────────────────────────────────────────────────────

pub const CHAT_SOURCE_LABEL: &str = "PostgreSQL Database";
pub const LLM_PROVIDER: &str = "ollama";

pub fn content_type_cache_key(content_type: &str) -> String {
    format!("{}{}", CACHE_KEY_CONTENT_TYPE_PREFIX, content_type)
}
