use async_trait::async_trait;
use serde_json::Value;

use crate::{
    entities::content::{ContentEntry, ContentInput},
    errors::AppError,
    repositories::sqlx_repo::SqlxContentRepo,
};

const CONTENT_COLUMNS: &str = r#"id, key, "type", value, created_at, updated_at"#;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<ContentEntry>, AppError>;

    async fn list_by_type(&self, content_type: &str) -> Result<Vec<ContentEntry>, AppError>;

    /// `None` when no row carries the key
    async fn find_by_key(&self, key: &str) -> Result<Option<ContentEntry>, AppError>;

    async fn create(&self, input: &ContentInput) -> Result<ContentEntry, AppError>;

    /// Returns the row as it was before the write, then as it is after
    async fn update(&self, id: i32, input: &ContentInput) -> Result<(ContentEntry, ContentEntry), AppError>;

    /// Returns the deleted row so callers can invalidate what depended on it
    async fn delete(&self, id: i32) -> Result<ContentEntry, AppError>;

    /// Inserts or replaces the document stored under `key`
    async fn upsert_by_key(&self, key: &str, content_type: &str, value: &Value) -> Result<ContentEntry, AppError>;
}

impl SqlxContentRepo {
    pub fn new(pool: sqlx::PgPool) -> Self {
        SqlxContentRepo { pool }
    }
}

fn not_found(e: sqlx::Error) -> AppError {
    match e {
        sqlx::Error::RowNotFound => AppError::NotFound("Content not found".into()),
        _ => e.into(),
    }
}

#[async_trait]
impl ContentRepository for SqlxContentRepo {
    async fn list(&self) -> Result<Vec<ContentEntry>, AppError> {
        let entries = sqlx::query_as::<_, ContentEntry>(&format!(
            r#"SELECT {CONTENT_COLUMNS} FROM content ORDER BY "type", key"#
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    async fn list_by_type(&self, content_type: &str) -> Result<Vec<ContentEntry>, AppError> {
        let entries = sqlx::query_as::<_, ContentEntry>(&format!(
            r#"SELECT {CONTENT_COLUMNS} FROM content WHERE "type" = $1 ORDER BY key"#
        ))
        .bind(content_type)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    async fn find_by_key(&self, key: &str) -> Result<Option<ContentEntry>, AppError> {
        let entry = sqlx::query_as::<_, ContentEntry>(&format!(
            "SELECT {CONTENT_COLUMNS} FROM content WHERE key = $1"
        ))
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entry)
    }

    async fn create(&self, input: &ContentInput) -> Result<ContentEntry, AppError> {
        sqlx::query_as::<_, ContentEntry>(&format!(
            r#"
            INSERT INTO content (key, "type", value)
            VALUES ($1, $2, $3)
            RETURNING {CONTENT_COLUMNS}
            "#
        ))
        .bind(&input.key)
        .bind(&input.content_type)
        .bind(&input.value)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::Conflict(_) => AppError::Conflict(format!("Content key '{}' already exists", input.key)),
            other => other,
        })
    }

    async fn update(&self, id: i32, input: &ContentInput) -> Result<(ContentEntry, ContentEntry), AppError> {
        let mut tx = self.pool.begin().await?;

        let previous = sqlx::query_as::<_, ContentEntry>(&format!(
            "SELECT {CONTENT_COLUMNS} FROM content WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(not_found)?;

        let updated = sqlx::query_as::<_, ContentEntry>(&format!(
            r#"
            UPDATE content
            SET key = $1, "type" = $2, value = $3, updated_at = NOW()
            WHERE id = $4
            RETURNING {CONTENT_COLUMNS}
            "#
        ))
        .bind(&input.key)
        .bind(&input.content_type)
        .bind(&input.value)
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::Conflict(_) => AppError::Conflict(format!("Content key '{}' already exists", input.key)),
            other => other,
        })?;

        tx.commit().await?;
        Ok((previous, updated))
    }

    async fn delete(&self, id: i32) -> Result<ContentEntry, AppError> {
        sqlx::query_as::<_, ContentEntry>(&format!(
            "DELETE FROM content WHERE id = $1 RETURNING {CONTENT_COLUMNS}"
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found)
    }

    async fn upsert_by_key(&self, key: &str, content_type: &str, value: &Value) -> Result<ContentEntry, AppError> {
        let entry = sqlx::query_as::<_, ContentEntry>(&format!(
            r#"
            INSERT INTO content (key, "type", value)
            VALUES ($1, $2, $3)
            ON CONFLICT (key) DO UPDATE
            SET value = EXCLUDED.value, updated_at = NOW()
            RETURNING {CONTENT_COLUMNS}
            "#
        ))
        .bind(key)
        .bind(content_type)
        .bind(value)
        .fetch_one(&self.pool)
        .await?;

        Ok(entry)
    }
}
