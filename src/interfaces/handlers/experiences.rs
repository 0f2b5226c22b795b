use actix_web::{web, HttpRequest, HttpResponse, Responder};
use tracing::instrument;

use crate::{
    entities::experience::ExperienceInput, errors::AppError, use_cases::extractors::AdminAccess,
    utils::etag::json_with_etag, AppState,
};

#[instrument(skip(req, state))]
pub async fn list_experiences(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let experiences = state.experience_handler.list_experiences().await?;
    json_with_etag(&req, &experiences)
}

#[instrument(skip(state))]
pub async fn get_experience(state: web::Data<AppState>, path: web::Path<i32>) -> Result<impl Responder, AppError> {
    let experience = state.experience_handler.get_experience(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(experience))
}

#[instrument(skip(_admin, state, body))]
pub async fn create_experience(
    _admin: AdminAccess,
    state: web::Data<AppState>,
    body: web::Json<ExperienceInput>,
) -> Result<impl Responder, AppError> {
    let experience = state.experience_handler.create_experience(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(experience))
}

#[instrument(skip(_admin, state, body))]
pub async fn update_experience(
    _admin: AdminAccess,
    state: web::Data<AppState>,
    path: web::Path<i32>,
    body: web::Json<ExperienceInput>,
) -> Result<impl Responder, AppError> {
    let experience = state
        .experience_handler
        .update_experience(path.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(experience))
}

#[instrument(skip(_admin, state))]
pub async fn delete_experience(
    _admin: AdminAccess,
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    state.experience_handler.delete_experience(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
