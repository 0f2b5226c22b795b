use actix_web::{web, HttpRequest, HttpResponse, Responder};
use tracing::instrument;

use crate::{
    entities::skill::SkillInput, errors::AppError, use_cases::extractors::AdminAccess,
    utils::etag::json_with_etag, AppState,
};

#[instrument(skip(req, state))]
pub async fn list_skills(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let skills = state.skill_handler.list_skills().await?;
    json_with_etag(&req, &skills)
}

#[instrument(skip(state))]
pub async fn get_skill(state: web::Data<AppState>, path: web::Path<i32>) -> Result<impl Responder, AppError> {
    let skill = state.skill_handler.get_skill(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(skill))
}

#[instrument(skip(_admin, state, body))]
pub async fn create_skill(
    _admin: AdminAccess,
    state: web::Data<AppState>,
    body: web::Json<SkillInput>,
) -> Result<impl Responder, AppError> {
    let skill = state.skill_handler.create_skill(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(skill))
}

#[instrument(skip(_admin, state, body))]
pub async fn update_skill(
    _admin: AdminAccess,
    state: web::Data<AppState>,
    path: web::Path<i32>,
    body: web::Json<SkillInput>,
) -> Result<impl Responder, AppError> {
    let skill = state
        .skill_handler
        .update_skill(path.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(skill))
}

#[instrument(skip(_admin, state))]
pub async fn delete_skill(
    _admin: AdminAccess,
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    state.skill_handler.delete_skill(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
