use actix_web::{web, HttpResponse, Responder};
use tracing::instrument;

use crate::{
    entities::content::{AboutData, ContactData, ContentInput},
    errors::AppError,
    use_cases::extractors::AdminAccess,
    AppState,
};

#[instrument(skip(state))]
pub async fn list_content(state: web::Data<AppState>) -> Result<impl Responder, AppError> {
    let entries = state.content_handler.list_content().await?;
    Ok(HttpResponse::Ok().json(entries))
}

#[instrument(skip(state))]
pub async fn list_content_by_type(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let entries = state.content_handler.list_content_by_type(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(entries))
}

#[instrument(skip(_admin, state, body))]
pub async fn create_content(
    _admin: AdminAccess,
    state: web::Data<AppState>,
    body: web::Json<ContentInput>,
) -> Result<impl Responder, AppError> {
    let entry = state.content_handler.create_content(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(entry))
}

#[instrument(skip(_admin, state, body))]
pub async fn update_content(
    _admin: AdminAccess,
    state: web::Data<AppState>,
    path: web::Path<i32>,
    body: web::Json<ContentInput>,
) -> Result<impl Responder, AppError> {
    let entry = state
        .content_handler
        .update_content(path.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(entry))
}

#[instrument(skip(_admin, state))]
pub async fn delete_content(
    _admin: AdminAccess,
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    state.content_handler.delete_content(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

// ───── Pages ────────────────────────────────────────────────────────

#[instrument(skip(state))]
pub async fn get_about(state: web::Data<AppState>) -> Result<impl Responder, AppError> {
    let about = state.content_handler.get_about().await?;
    Ok(HttpResponse::Ok().json(about))
}

#[instrument(skip(_admin, state, body))]
pub async fn update_about(
    _admin: AdminAccess,
    state: web::Data<AppState>,
    body: web::Json<AboutData>,
) -> Result<impl Responder, AppError> {
    let about = state.content_handler.update_about(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(about))
}

#[instrument(skip(state))]
pub async fn get_contact(state: web::Data<AppState>) -> Result<impl Responder, AppError> {
    let contact = state.content_handler.get_contact().await?;
    Ok(HttpResponse::Ok().json(contact))
}

#[instrument(skip(_admin, state, body))]
pub async fn update_contact(
    _admin: AdminAccess,
    state: web::Data<AppState>,
    body: web::Json<ContactData>,
) -> Result<impl Responder, AppError> {
    let contact = state.content_handler.update_contact(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(contact))
}
