pub mod analytics;
pub mod content;
pub mod experience;
pub mod health;
pub mod project;
pub mod skill;
pub mod sqlx_repo;
