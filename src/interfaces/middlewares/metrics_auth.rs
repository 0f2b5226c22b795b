use actix_web::{
    body::{EitherBody, MessageBody},
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::{header, StatusCode},
    web, Error,
};
use futures_util::future::{ok, LocalBoxFuture, Ready};
use std::rc::Rc;

use crate::{
    handlers::json_error::json_error,
    security::credentials::{constant_time_eq, parse_basic_auth},
    AppState,
};

/// Basic-Auth gate for `/metrics`; open when no credentials are configured
pub struct MetricsAuth;

impl<S, B> Transform<S, ServiceRequest> for MetricsAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = MetricsAuthService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(MetricsAuthService {
            service: Rc::new(service),
        })
    }
}

pub struct MetricsAuthService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for MetricsAuthService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let verdict = match req.app_data::<web::Data<AppState>>() {
                Some(state) => check_credentials(&req, state.config.metrics_credentials()),
                None => {
                    tracing::error!("AppState missing in metrics auth middleware");
                    Err("Authentication required")
                }
            };

            match verdict {
                Ok(()) => service.call(req).await.map(|res| res.map_into_left_body()),
                Err(message) => {
                    let mut res = json_error(StatusCode::UNAUTHORIZED, message, None);
                    res.headers_mut().insert(
                        header::WWW_AUTHENTICATE,
                        header::HeaderValue::from_static("Basic realm=\"Metrics\""),
                    );
                    Ok(req.into_response(res).map_into_right_body())
                }
            }
        })
    }
}

fn check_credentials(req: &ServiceRequest, expected: Option<(&str, &str)>) -> Result<(), &'static str> {
    let Some((username, password)) = expected else {
        return Ok(());
    };

    let presented = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(parse_basic_auth)
        .ok_or("Authentication required")?;

    let user_ok = constant_time_eq(presented.username.as_bytes(), username.as_bytes());
    let pass_ok = constant_time_eq(presented.password.as_bytes(), password.as_bytes());
    if user_ok && pass_ok {
        Ok(())
    } else {
        tracing::warn!("Rejected metrics request with invalid credentials");
        Err("Invalid credentials")
    }
}
