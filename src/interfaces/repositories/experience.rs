use async_trait::async_trait;

use crate::{
    entities::experience::{Experience, ExperienceInput},
    errors::AppError,
    repositories::sqlx_repo::SqlxExperienceRepo,
};

const EXPERIENCE_COLUMNS: &str = "id, title, company, start_date, end_date, current, description,
    technologies, display_order, active, created_at, updated_at";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExperienceRepository: Send + Sync {
    /// Active entries, current roles first, then most recent
    async fn list_active(&self) -> Result<Vec<Experience>, AppError>;

    async fn get_active(&self, id: i32) -> Result<Experience, AppError>;

    async fn create(&self, input: &ExperienceInput) -> Result<Experience, AppError>;

    async fn update(&self, id: i32, input: &ExperienceInput) -> Result<Experience, AppError>;

    async fn delete(&self, id: i32) -> Result<(), AppError>;
}

impl SqlxExperienceRepo {
    pub fn new(pool: sqlx::PgPool) -> Self {
        SqlxExperienceRepo { pool }
    }
}

fn not_found(e: sqlx::Error) -> AppError {
    match e {
        sqlx::Error::RowNotFound => AppError::NotFound("Experience not found".into()),
        _ => e.into(),
    }
}

#[async_trait]
impl ExperienceRepository for SqlxExperienceRepo {
    async fn list_active(&self) -> Result<Vec<Experience>, AppError> {
        let entries = sqlx::query_as::<_, Experience>(&format!(
            r#"
            SELECT {EXPERIENCE_COLUMNS}
            FROM experience
            WHERE active = TRUE
            ORDER BY display_order, current DESC, start_date DESC, id
            "#
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    async fn get_active(&self, id: i32) -> Result<Experience, AppError> {
        sqlx::query_as::<_, Experience>(&format!(
            "SELECT {EXPERIENCE_COLUMNS} FROM experience WHERE id = $1 AND active = TRUE"
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found)
    }

    async fn create(&self, input: &ExperienceInput) -> Result<Experience, AppError> {
        let entry = sqlx::query_as::<_, Experience>(&format!(
            r#"
            INSERT INTO experience
                (title, company, start_date, end_date, current, description, technologies,
                 display_order, active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {EXPERIENCE_COLUMNS}
            "#
        ))
        .bind(&input.title)
        .bind(&input.company)
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(input.current)
        .bind(&input.description)
        .bind(&input.technologies)
        .bind(input.display_order)
        .bind(input.active)
        .fetch_one(&self.pool)
        .await?;

        Ok(entry)
    }

    async fn update(&self, id: i32, input: &ExperienceInput) -> Result<Experience, AppError> {
        sqlx::query_as::<_, Experience>(&format!(
            r#"
            UPDATE experience
            SET
                title = $1,
                company = $2,
                start_date = $3,
                end_date = $4,
                current = $5,
                description = $6,
                technologies = $7,
                display_order = $8,
                active = $9,
                updated_at = NOW()
            WHERE id = $10
            RETURNING {EXPERIENCE_COLUMNS}
            "#
        ))
        .bind(&input.title)
        .bind(&input.company)
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(input.current)
        .bind(&input.description)
        .bind(&input.technologies)
        .bind(input.display_order)
        .bind(input.active)
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found)
    }

    async fn delete(&self, id: i32) -> Result<(), AppError> {
        sqlx::query("DELETE FROM experience WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map(|result| {
                if result.rows_affected() == 0 {
                    Err(AppError::NotFound("Experience not found".into()))
                } else {
                    Ok(())
                }
            })?
    }
}
