use std::sync::Arc;

use validator::Validate;

use crate::{
    cache::ResponseCache,
    constants::{CACHE_KEY_SKILLS, LIST_CACHE_TTL},
    entities::skill::{Skill, SkillInput},
    errors::AppError,
    repositories::skill::SkillRepository,
    utils::valid_id::valid_id,
};

pub struct SkillHandler {
    pub skill_repo: Arc<dyn SkillRepository>,
    cache: ResponseCache,
}

impl SkillHandler {
    pub fn new(skill_repo: Arc<dyn SkillRepository>, cache: ResponseCache) -> Self {
        SkillHandler { skill_repo, cache }
    }

    pub async fn list_skills(&self) -> Result<Vec<Skill>, AppError> {
        self.cache
            .get_or_load(CACHE_KEY_SKILLS, LIST_CACHE_TTL, move || self.skill_repo.list())
            .await
    }

    pub async fn get_skill(&self, id: i32) -> Result<Skill, AppError> {
        self.skill_repo.get(valid_id(id)?).await
    }

    pub async fn create_skill(&self, input: SkillInput) -> Result<Skill, AppError> {
        input.validate()?;
        let skill = self.skill_repo.create(&input.sanitized()).await?;
        self.invalidate().await;
        Ok(skill)
    }

    pub async fn update_skill(&self, id: i32, input: SkillInput) -> Result<Skill, AppError> {
        let id = valid_id(id)?;
        input.validate()?;
        let skill = self.skill_repo.update(id, &input.sanitized()).await?;
        self.invalidate().await;
        Ok(skill)
    }

    pub async fn delete_skill(&self, id: i32) -> Result<(), AppError> {
        self.skill_repo.delete(valid_id(id)?).await?;
        self.invalidate().await;
        Ok(())
    }

    async fn invalidate(&self) {
        self.cache.invalidate(&[CACHE_KEY_SKILLS.to_string()]).await;
    }
}
