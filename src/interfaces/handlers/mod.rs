pub mod admin;
pub mod analytics;
pub mod chat;
pub mod content;
pub mod experiences;
pub mod home;
pub mod json_error;
pub mod projects;
pub mod skills;
pub mod system;
