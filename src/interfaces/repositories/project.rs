use async_trait::async_trait;

use crate::{
    entities::project::{Project, ProjectInput},
    errors::AppError,
    repositories::sqlx_repo::SqlxProjectRepo,
};

const PROJECT_COLUMNS: &str = r#"id, title, description, "type", technologies, github_url, live_url,
    video_url, featured, active, display_order, created_at, updated_at"#;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Publicly visible projects, in display order
    async fn list_active(&self) -> Result<Vec<Project>, AppError>;

    /// Every project, including hidden ones
    async fn list_all(&self) -> Result<Vec<Project>, AppError>;

    async fn get_active(&self, id: i32) -> Result<Project, AppError>;

    async fn create(&self, input: &ProjectInput) -> Result<Project, AppError>;

    async fn update(&self, id: i32, input: &ProjectInput) -> Result<Project, AppError>;

    async fn delete(&self, id: i32) -> Result<(), AppError>;

    async fn set_active(&self, id: i32, active: bool) -> Result<Project, AppError>;

    /// (total, active)
    async fn counts(&self) -> Result<(i64, i64), AppError>;
}

impl SqlxProjectRepo {
    pub fn new(pool: sqlx::PgPool) -> Self {
        SqlxProjectRepo { pool }
    }
}

fn not_found(e: sqlx::Error) -> AppError {
    match e {
        sqlx::Error::RowNotFound => AppError::NotFound("Project not found".into()),
        _ => e.into(),
    }
}

#[async_trait]
impl ProjectRepository for SqlxProjectRepo {
    async fn list_active(&self) -> Result<Vec<Project>, AppError> {
        let projects = sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE active = TRUE ORDER BY display_order, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(projects)
    }

    async fn list_all(&self) -> Result<Vec<Project>, AppError> {
        let projects = sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects ORDER BY display_order, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(projects)
    }

    async fn get_active(&self, id: i32) -> Result<Project, AppError> {
        sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1 AND active = TRUE"
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found)
    }

    async fn create(&self, input: &ProjectInput) -> Result<Project, AppError> {
        let project = sqlx::query_as::<_, Project>(&format!(
            r#"
            INSERT INTO projects
                (title, description, "type", technologies, github_url, live_url, video_url,
                 featured, active, display_order)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {PROJECT_COLUMNS}
            "#
        ))
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.project_type)
        .bind(&input.technologies)
        .bind(&input.github_url)
        .bind(&input.live_url)
        .bind(&input.video_url)
        .bind(input.featured)
        .bind(input.active)
        .bind(input.display_order)
        .fetch_one(&self.pool)
        .await?;

        Ok(project)
    }

    async fn update(&self, id: i32, input: &ProjectInput) -> Result<Project, AppError> {
        sqlx::query_as::<_, Project>(&format!(
            r#"
            UPDATE projects
            SET
                title = $1,
                description = $2,
                "type" = $3,
                technologies = $4,
                github_url = $5,
                live_url = $6,
                video_url = $7,
                featured = $8,
                active = $9,
                display_order = $10,
                updated_at = NOW()
            WHERE id = $11
            RETURNING {PROJECT_COLUMNS}
            "#
        ))
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.project_type)
        .bind(&input.technologies)
        .bind(&input.github_url)
        .bind(&input.live_url)
        .bind(&input.video_url)
        .bind(input.featured)
        .bind(input.active)
        .bind(input.display_order)
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found)
    }

    async fn delete(&self, id: i32) -> Result<(), AppError> {
        sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map(|result| {
                if result.rows_affected() == 0 {
                    Err(AppError::NotFound("Project not found".into()))
                } else {
                    Ok(())
                }
            })?
    }

    async fn set_active(&self, id: i32, active: bool) -> Result<Project, AppError> {
        sqlx::query_as::<_, Project>(&format!(
            "UPDATE projects SET active = $1, updated_at = NOW() WHERE id = $2 RETURNING {PROJECT_COLUMNS}"
        ))
        .bind(active)
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found)
    }

    async fn counts(&self) -> Result<(i64, i64), AppError> {
        let counts: (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE active) FROM projects"
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(counts)
    }
}
