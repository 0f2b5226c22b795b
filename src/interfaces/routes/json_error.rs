use actix_web::{
    error::{JsonPayloadError, PathError, QueryPayloadError},
    web,
};

use crate::errors::AppError;

/// Largest accepted JSON body
const JSON_LIMIT_BYTES: usize = 64 * 1024;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(JSON_LIMIT_BYTES)
            .error_handler(|err, _req| json_payload_error(err).into()),
    )
    .app_data(web::PathConfig::default().error_handler(|err, _req| path_error(err).into()))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| query_error(err).into()));
}

fn json_payload_error(err: JsonPayloadError) -> AppError {
    tracing::debug!(error = %err, "Rejected JSON payload");
    AppError::InvalidInput(format!("JSON payload error: {}", err))
}

fn path_error(err: PathError) -> AppError {
    tracing::debug!(error = %err, "Rejected path parameter");
    AppError::InvalidInput("Invalid ID".to_string())
}

fn query_error(err: QueryPayloadError) -> AppError {
    AppError::InvalidInput(format!("Query error: {}", err))
}
