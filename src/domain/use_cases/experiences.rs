use std::sync::Arc;

use validator::Validate;

use crate::{
    cache::ResponseCache,
    constants::{CACHE_KEY_EXPERIENCES, LIST_CACHE_TTL},
    entities::experience::{Experience, ExperienceInput},
    errors::AppError,
    repositories::experience::ExperienceRepository,
    utils::valid_id::valid_id,
};

pub struct ExperienceHandler {
    pub experience_repo: Arc<dyn ExperienceRepository>,
    cache: ResponseCache,
}

impl ExperienceHandler {
    pub fn new(experience_repo: Arc<dyn ExperienceRepository>, cache: ResponseCache) -> Self {
        ExperienceHandler { experience_repo, cache }
    }

    pub async fn list_experiences(&self) -> Result<Vec<Experience>, AppError> {
        self.cache
            .get_or_load(CACHE_KEY_EXPERIENCES, LIST_CACHE_TTL, move || self.experience_repo.list_active())
            .await
    }

    pub async fn get_experience(&self, id: i32) -> Result<Experience, AppError> {
        self.experience_repo.get_active(valid_id(id)?).await
    }

    pub async fn create_experience(&self, input: ExperienceInput) -> Result<Experience, AppError> {
        input.validate()?;
        let entry = self.experience_repo.create(&input.sanitized()).await?;
        self.invalidate().await;
        Ok(entry)
    }

    pub async fn update_experience(&self, id: i32, input: ExperienceInput) -> Result<Experience, AppError> {
        let id = valid_id(id)?;
        input.validate()?;
        let entry = self.experience_repo.update(id, &input.sanitized()).await?;
        self.invalidate().await;
        Ok(entry)
    }

    pub async fn delete_experience(&self, id: i32) -> Result<(), AppError> {
        self.experience_repo.delete(valid_id(id)?).await?;
        self.invalidate().await;
        Ok(())
    }

    async fn invalidate(&self) {
        self.cache.invalidate(&[CACHE_KEY_EXPERIENCES.to_string()]).await;
    }
}
