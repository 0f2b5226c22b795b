pub mod analytics;
pub mod chat;
pub mod content;
pub mod context;
pub mod experiences;
pub mod extractors;
pub mod projects;
pub mod skills;
