use std::sync::Arc;

use crate::repositories::{
    analytics::AnalyticsRepository,
    content::ContentRepository,
    experience::ExperienceRepository,
    health::HealthRepository,
    project::ProjectRepository,
    skill::SkillRepository,
    sqlx_repo::{
        SqlxAnalyticsRepo, SqlxContentRepo, SqlxExperienceRepo, SqlxHealthRepo, SqlxProjectRepo,
        SqlxSkillRepo,
    },
};

/// One handle per table group, shared by the use-case handlers
#[derive(Clone)]
pub struct SharedRepositories {
    pub project_repo: Arc<dyn ProjectRepository>,
    pub skill_repo: Arc<dyn SkillRepository>,
    pub experience_repo: Arc<dyn ExperienceRepository>,
    pub content_repo: Arc<dyn ContentRepository>,
    pub analytics_repo: Arc<dyn AnalyticsRepository>,
    pub health_repo: Arc<dyn HealthRepository>,
}

impl SharedRepositories {
    pub fn postgres(pool: sqlx::PgPool) -> Self {
        SharedRepositories {
            project_repo: Arc::new(SqlxProjectRepo::new(pool.clone())),
            skill_repo: Arc::new(SqlxSkillRepo::new(pool.clone())),
            experience_repo: Arc::new(SqlxExperienceRepo::new(pool.clone())),
            content_repo: Arc::new(SqlxContentRepo::new(pool.clone())),
            analytics_repo: Arc::new(SqlxAnalyticsRepo::new(pool.clone())),
            health_repo: Arc::new(SqlxHealthRepo::new(pool)),
        }
    }
}
