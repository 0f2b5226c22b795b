use actix_web::{web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};

use crate::{
    errors::AppError,
    security::credentials::{constant_time_eq, parse_bearer_token},
    AppState,
};

/// Guards write and admin routes. When an admin token is configured the request
/// must carry it as a bearer token; without one the routes stay open.
#[derive(Debug)]
pub struct AdminAccess;

impl FromRequest for AdminAccess {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let Some(state) = req.app_data::<web::Data<AppState>>() else {
            tracing::error!("AppState missing in admin extractor");
            return ready(Err(AppError::InternalError("Application state missing".into())));
        };

        let Some(expected) = state.config.admin_token.as_deref() else {
            return ready(Ok(AdminAccess));
        };

        let presented = req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(parse_bearer_token);

        match presented {
            Some(token) if constant_time_eq(token.as_bytes(), expected.as_bytes()) => ready(Ok(AdminAccess)),
            Some(_) => {
                tracing::warn!(path = %req.path(), "Rejected admin request with invalid token");
                ready(Err(AppError::UnauthorizedAccess))
            }
            None => ready(Err(AppError::UnauthorizedAccess)),
        }
    }
}
