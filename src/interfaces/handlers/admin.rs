use actix_web::{web, HttpResponse, Responder};
use tracing::instrument;

use crate::{errors::AppError, use_cases::extractors::AdminAccess, AppState};

#[instrument(skip(_admin, state))]
pub async fn admin_projects(
    _admin: AdminAccess,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let overview = state.project_handler.admin_projects().await?;
    Ok(HttpResponse::Ok().json(overview))
}

#[instrument(skip(_admin, state))]
pub async fn activate_project(
    _admin: AdminAccess,
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let project = state.project_handler.set_project_active(path.into_inner(), true).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Project activated",
        "project": project
    })))
}

#[instrument(skip(_admin, state))]
pub async fn deactivate_project(
    _admin: AdminAccess,
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let project = state.project_handler.set_project_active(path.into_inner(), false).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Project deactivated",
        "project": project
    })))
}

#[instrument(skip(_admin, state))]
pub async fn project_stats(
    _admin: AdminAccess,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let stats = state.project_handler.project_stats().await?;
    Ok(HttpResponse::Ok().json(stats))
}
