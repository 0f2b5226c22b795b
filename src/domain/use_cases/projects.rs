use std::sync::Arc;

use validator::Validate;

use crate::{
    cache::ResponseCache,
    constants::{CACHE_KEY_PROJECTS, LIST_CACHE_TTL},
    entities::project::{AdminProjectsResponse, Project, ProjectInput, ProjectStats},
    errors::AppError,
    repositories::project::ProjectRepository,
    utils::valid_id::valid_id,
};

pub struct ProjectHandler {
    pub project_repo: Arc<dyn ProjectRepository>,
    cache: ResponseCache,
}

impl ProjectHandler {
    pub fn new(project_repo: Arc<dyn ProjectRepository>, cache: ResponseCache) -> Self {
        ProjectHandler { project_repo, cache }
    }

    /// Active projects, served from cache when possible
    pub async fn list_projects(&self) -> Result<Vec<Project>, AppError> {
        self.cache
            .get_or_load(CACHE_KEY_PROJECTS, LIST_CACHE_TTL, move || self.project_repo.list_active())
            .await
    }

    /// A single active project; hidden projects read as missing
    pub async fn get_project(&self, id: i32) -> Result<Project, AppError> {
        let id = valid_id(id)?;
        self.project_repo.get_active(id).await
    }

    pub async fn create_project(&self, input: ProjectInput) -> Result<Project, AppError> {
        input.validate()?;
        let project = self.project_repo.create(&input.sanitized()).await?;

        self.invalidate().await;
        tracing::info!(project_id = project.id, "Project created");
        Ok(project)
    }

    /// Replaces every field of the project
    pub async fn update_project(&self, id: i32, input: ProjectInput) -> Result<Project, AppError> {
        let id = valid_id(id)?;
        input.validate()?;
        let project = self.project_repo.update(id, &input.sanitized()).await?;

        self.invalidate().await;
        tracing::info!(project_id = id, active = project.active, "Project updated");
        Ok(project)
    }

    pub async fn delete_project(&self, id: i32) -> Result<(), AppError> {
        let id = valid_id(id)?;
        self.project_repo.delete(id).await?;

        self.invalidate().await;
        tracing::info!(project_id = id, "Project deleted");
        Ok(())
    }

    // ───── Admin ────────────────────────────────────────────────────

    /// Every project, hidden ones included, with visibility counts
    pub async fn admin_projects(&self) -> Result<AdminProjectsResponse, AppError> {
        let projects = self.project_repo.list_all().await?;
        Ok(projects.into())
    }

    pub async fn set_project_active(&self, id: i32, active: bool) -> Result<Project, AppError> {
        let id = valid_id(id)?;
        let project = self.project_repo.set_active(id, active).await?;

        self.invalidate().await;
        tracing::info!(project_id = id, active, "Project visibility changed");
        Ok(project)
    }

    pub async fn project_stats(&self) -> Result<ProjectStats, AppError> {
        let (total, active) = self.project_repo.counts().await?;
        Ok(ProjectStats::from_counts(total, active))
    }

    async fn invalidate(&self) {
        self.cache.invalidate(&[CACHE_KEY_PROJECTS.to_string()]).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::project::MockProjectRepository;

    fn handler(repo: MockProjectRepository) -> ProjectHandler {
        ProjectHandler::new(Arc::new(repo), ResponseCache::disabled())
    }

    #[tokio::test]
    async fn invalid_input_never_reaches_the_database() {
        let mut repo = MockProjectRepository::new();
        repo.expect_create().never();

        let input: ProjectInput = serde_json::from_value(serde_json::json!({
            "title": "", "description": "d"
        }))
        .unwrap();

        let err = handler(repo).create_project(input).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn out_of_range_id_is_rejected() {
        let mut repo = MockProjectRepository::new();
        repo.expect_get_active().never();

        let err = handler(repo).get_project(0).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn stats_use_repository_counts() {
        let mut repo = MockProjectRepository::new();
        repo.expect_counts().returning(|| Ok((4, 3)));

        let stats = handler(repo).project_stats().await.unwrap();
        assert_eq!(stats, ProjectStats::from_counts(4, 3));
        assert_eq!(stats.active_percentage, 75.0);
    }
}
