use actix_web::{web, HttpRequest, HttpResponse, Responder};
use tracing::instrument;

use crate::{
    entities::project::ProjectInput, errors::AppError, use_cases::extractors::AdminAccess,
    utils::etag::json_with_etag, AppState,
};

#[instrument(skip(req, state))]
pub async fn list_projects(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let projects = state.project_handler.list_projects().await?;
    json_with_etag(&req, &projects)
}

#[instrument(skip(state))]
pub async fn get_project(
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let project = state.project_handler.get_project(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(project))
}

#[instrument(skip(_admin, state, body))]
pub async fn create_project(
    _admin: AdminAccess,
    state: web::Data<AppState>,
    body: web::Json<ProjectInput>,
) -> Result<impl Responder, AppError> {
    let project = state.project_handler.create_project(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(project))
}

#[instrument(skip(_admin, state, body))]
pub async fn update_project(
    _admin: AdminAccess,
    state: web::Data<AppState>,
    path: web::Path<i32>,
    body: web::Json<ProjectInput>,
) -> Result<impl Responder, AppError> {
    let project = state
        .project_handler
        .update_project(path.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(project))
}

#[instrument(skip(_admin, state))]
pub async fn delete_project(
    _admin: AdminAccess,
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    state.project_handler.delete_project(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
