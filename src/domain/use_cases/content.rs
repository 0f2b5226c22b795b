use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use validator::Validate;

use crate::{
    cache::ResponseCache,
    constants::{
        content_type_cache_key, CACHE_KEY_ABOUT, CACHE_KEY_CONTACT, CACHE_KEY_CONTENT_ALL,
        CONTENT_KEY_ABOUT, CONTENT_KEY_CONTACT, CONTENT_TYPE_PAGE, LIST_CACHE_TTL, PAGE_CACHE_TTL,
    },
    entities::content::{AboutData, ContactData, ContentEntry, ContentInput},
    errors::AppError,
    repositories::content::ContentRepository,
    security::sanitize::validate_safe_text,
    utils::valid_id::valid_id,
};

pub struct ContentHandler {
    pub content_repo: Arc<dyn ContentRepository>,
    cache: ResponseCache,
}

impl ContentHandler {
    pub fn new(content_repo: Arc<dyn ContentRepository>, cache: ResponseCache) -> Self {
        ContentHandler { content_repo, cache }
    }

    pub async fn list_content(&self) -> Result<Vec<ContentEntry>, AppError> {
        self.cache
            .get_or_load(CACHE_KEY_CONTENT_ALL, LIST_CACHE_TTL, move || self.content_repo.list())
            .await
    }

    pub async fn list_content_by_type(&self, content_type: &str) -> Result<Vec<ContentEntry>, AppError> {
        let content_type = content_type.trim();
        if content_type.is_empty() || content_type.len() > 100 || validate_safe_text(content_type).is_err() {
            return Err(AppError::InvalidInput("Invalid content type".into()));
        }

        self.cache
            .get_or_load(&content_type_cache_key(content_type), LIST_CACHE_TTL, move || {
                self.content_repo.list_by_type(content_type)
            })
            .await
    }

    pub async fn create_content(&self, input: ContentInput) -> Result<ContentEntry, AppError> {
        input.validate()?;
        let entry = self.content_repo.create(&input.sanitized()).await?;
        self.invalidate_for(&entry).await;
        Ok(entry)
    }

    pub async fn update_content(&self, id: i32, input: ContentInput) -> Result<ContentEntry, AppError> {
        let id = valid_id(id)?;
        input.validate()?;
        let (previous, entry) = self.content_repo.update(id, &input.sanitized()).await?;
        // A rekeyed or retyped row leaves views under its old key and type too.
        self.invalidate_for(&previous).await;
        self.invalidate_for(&entry).await;
        Ok(entry)
    }

    pub async fn delete_content(&self, id: i32) -> Result<(), AppError> {
        let entry = self.content_repo.delete(valid_id(id)?).await?;
        self.invalidate_for(&entry).await;
        Ok(())
    }

    // ───── Pages ────────────────────────────────────────────────────

    pub async fn get_about(&self) -> Result<AboutData, AppError> {
        self.get_page(CONTENT_KEY_ABOUT, CACHE_KEY_ABOUT, "About content not found").await
    }

    pub async fn update_about(&self, about: AboutData) -> Result<AboutData, AppError> {
        about.validate()?;
        self.put_page(CONTENT_KEY_ABOUT, about.sanitized()).await
    }

    pub async fn get_contact(&self) -> Result<ContactData, AppError> {
        self.get_page(CONTENT_KEY_CONTACT, CACHE_KEY_CONTACT, "Contact content not found").await
    }

    pub async fn update_contact(&self, contact: ContactData) -> Result<ContactData, AppError> {
        contact.validate()?;
        self.put_page(CONTENT_KEY_CONTACT, contact.sanitized()).await
    }

    async fn get_page<T>(&self, key: &str, cache_key: &str, missing: &str) -> Result<T, AppError>
    where
        T: Serialize + DeserializeOwned,
    {
        self.cache
            .get_or_load(cache_key, PAGE_CACHE_TTL, move || async move {
                let entry = self
                    .content_repo
                    .find_by_key(key)
                    .await?
                    .ok_or_else(|| AppError::NotFound(missing.to_string()))?;

                serde_json::from_value::<T>(entry.value).map_err(|e| {
                    AppError::InternalError(format!("Stored '{}' document is malformed: {}", key, e))
                })
            })
            .await
    }

    async fn put_page<T: Serialize>(&self, key: &str, page: T) -> Result<T, AppError> {
        let value = serde_json::to_value(&page)
            .map_err(|e| AppError::InternalError(format!("Failed to encode '{}' document: {}", key, e)))?;

        let entry = self.content_repo.upsert_by_key(key, CONTENT_TYPE_PAGE, &value).await?;
        self.invalidate_for(&entry).await;
        Ok(page)
    }

    /// Every cached view that may contain the row
    async fn invalidate_for(&self, entry: &ContentEntry) {
        let mut keys = vec![
            CACHE_KEY_CONTENT_ALL.to_string(),
            content_type_cache_key(&entry.content_type),
        ];
        match entry.key.as_str() {
            CONTENT_KEY_ABOUT => keys.push(CACHE_KEY_ABOUT.to_string()),
            CONTENT_KEY_CONTACT => keys.push(CACHE_KEY_CONTACT.to_string()),
            _ => {}
        }
        self.cache.invalidate(&keys).await;
    }
}
