pub mod analytics;
pub mod chat;
pub mod content;
pub mod experience;
pub mod project;
pub mod skill;
