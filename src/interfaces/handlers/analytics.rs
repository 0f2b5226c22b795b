use actix_web::{web, HttpRequest, HttpResponse, Responder};
use tracing::instrument;

use crate::{
    entities::analytics::{TrackResponse, VisitPayload},
    errors::AppError,
    utils::get_client_ip::get_client_ip,
    AppState,
};

#[instrument(skip(req, state, body))]
pub async fn track_visit(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<VisitPayload>,
) -> Result<impl Responder, AppError> {
    let client_ip = get_client_ip(&req, state.config.trust_x_forwarded_for);
    state
        .analytics_handler
        .track_visit(body.into_inner(), &client_ip)
        .await?;

    Ok(HttpResponse::Ok().json(TrackResponse {
        status: "tracked".to_string(),
    }))
}
