use async_trait::async_trait;

use crate::{
    entities::skill::{Skill, SkillInput},
    errors::AppError,
    repositories::sqlx_repo::SqlxSkillRepo,
};

const SKILL_COLUMNS: &str = "id, name, category, proficiency, icon, display_order, created_at, updated_at";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SkillRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Skill>, AppError>;

    async fn get(&self, id: i32) -> Result<Skill, AppError>;

    async fn create(&self, input: &SkillInput) -> Result<Skill, AppError>;

    async fn update(&self, id: i32, input: &SkillInput) -> Result<Skill, AppError>;

    async fn delete(&self, id: i32) -> Result<(), AppError>;
}

impl SqlxSkillRepo {
    pub fn new(pool: sqlx::PgPool) -> Self {
        SqlxSkillRepo { pool }
    }
}

fn not_found(e: sqlx::Error) -> AppError {
    match e {
        sqlx::Error::RowNotFound => AppError::NotFound("Skill not found".into()),
        _ => e.into(),
    }
}

#[async_trait]
impl SkillRepository for SqlxSkillRepo {
    async fn list(&self) -> Result<Vec<Skill>, AppError> {
        let skills = sqlx::query_as::<_, Skill>(&format!(
            "SELECT {SKILL_COLUMNS} FROM skills ORDER BY category, display_order, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(skills)
    }

    async fn get(&self, id: i32) -> Result<Skill, AppError> {
        sqlx::query_as::<_, Skill>(&format!("SELECT {SKILL_COLUMNS} FROM skills WHERE id = $1"))
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(not_found)
    }

    async fn create(&self, input: &SkillInput) -> Result<Skill, AppError> {
        let skill = sqlx::query_as::<_, Skill>(&format!(
            r#"
            INSERT INTO skills (name, category, proficiency, icon, display_order)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {SKILL_COLUMNS}
            "#
        ))
        .bind(&input.name)
        .bind(&input.category)
        .bind(input.proficiency)
        .bind(&input.icon)
        .bind(input.display_order)
        .fetch_one(&self.pool)
        .await?;

        Ok(skill)
    }

    async fn update(&self, id: i32, input: &SkillInput) -> Result<Skill, AppError> {
        sqlx::query_as::<_, Skill>(&format!(
            r#"
            UPDATE skills
            SET name = $1, category = $2, proficiency = $3, icon = $4, display_order = $5,
                updated_at = NOW()
            WHERE id = $6
            RETURNING {SKILL_COLUMNS}
            "#
        ))
        .bind(&input.name)
        .bind(&input.category)
        .bind(input.proficiency)
        .bind(&input.icon)
        .bind(input.display_order)
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found)
    }

    async fn delete(&self, id: i32) -> Result<(), AppError> {
        sqlx::query("DELETE FROM skills WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map(|result| {
                if result.rows_affected() == 0 {
                    Err(AppError::NotFound("Skill not found".into()))
                } else {
                    Ok(())
                }
            })?
    }
}
