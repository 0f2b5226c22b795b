use async_trait::async_trait;

use crate::{
    entities::analytics::Visit,
    errors::AppError,
    repositories::sqlx_repo::SqlxAnalyticsRepo,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnalyticsRepository: Send + Sync {
    /// Upserts the visitor row keyed by IP and bumps its visit counter
    async fn record_visit(&self, visit: &Visit) -> Result<(), AppError>;

    async fn record_project_view(&self, project_id: i32, ip: &str) -> Result<(), AppError>;
}

impl SqlxAnalyticsRepo {
    pub fn new(pool: sqlx::PgPool) -> Self {
        SqlxAnalyticsRepo { pool }
    }
}

#[async_trait]
impl AnalyticsRepository for SqlxAnalyticsRepo {
    async fn record_visit(&self, visit: &Visit) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO visitors (ip, user_agent, referrer, first_visit, last_visit, visit_count)
            VALUES ($1, $2, $3, NOW(), NOW(), 1)
            ON CONFLICT (ip) DO UPDATE
            SET
                last_visit = NOW(),
                visit_count = visitors.visit_count + 1,
                user_agent = COALESCE(EXCLUDED.user_agent, visitors.user_agent),
                referrer = COALESCE(EXCLUDED.referrer, visitors.referrer)
            "#
        )
        .bind(&visit.ip)
        .bind(&visit.user_agent)
        .bind(&visit.referrer)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn record_project_view(&self, project_id: i32, ip: &str) -> Result<(), AppError> {
        sqlx::query("INSERT INTO project_views (project_id, ip) VALUES ($1, $2)")
            .bind(project_id)
            .bind(ip)
            .execute(&self.pool)
            .await
            .map_err(|e| match AppError::from(e) {
                AppError::Conflict(_) => AppError::NotFound("Project not found".into()),
                other => other,
            })?;

        Ok(())
    }
}
