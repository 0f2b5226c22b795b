use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use tracing::instrument;

use crate::{entities::chat::ChatRequest, errors::AppError, AppState};

#[instrument(skip(state, body))]
pub async fn chat(
    state: web::Data<AppState>,
    body: web::Json<ChatRequest>,
) -> Result<impl Responder, AppError> {
    let response = state.chat_handler.process_chat(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// 200 when the configured model is available, 503 otherwise
#[instrument(skip(state))]
pub async fn chat_health(state: web::Data<AppState>) -> impl Responder {
    let (health, body) = state.chat_handler.health().await;
    let status = if health.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    HttpResponse::build(status).json(body)
}
