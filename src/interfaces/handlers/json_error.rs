use actix_web::{http::StatusCode, HttpResponse};

/// JSON error body for responses produced outside the handler layer
pub fn json_error(status: StatusCode, error: &str, message: Option<&str>) -> HttpResponse {
    let body = match message {
        Some(message) => serde_json::json!({ "error": error, "message": message }),
        None => serde_json::json!({ "error": error }),
    };
    HttpResponse::build(status).json(body)
}
