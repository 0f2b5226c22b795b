use actix_web::{
    body::{EitherBody, MessageBody},
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::StatusCode,
    Error,
};
use futures_util::future::{ok, LocalBoxFuture, Ready};
use std::rc::Rc;

use crate::{handlers::json_error::json_error, security::sanitize::contains_sql_injection};

/// Rejects requests whose decoded path segments or query values carry SQL keywords.
/// Every query is parameterised; this only turns obvious probes away early.
pub struct SqlGuard {
    enabled: bool,
}

impl SqlGuard {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SqlGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = SqlGuardService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(SqlGuardService {
            service: Rc::new(service),
            enabled: self.enabled,
        })
    }
}

pub struct SqlGuardService<S> {
    service: Rc<S>,
    enabled: bool,
}

impl<S, B> Service<ServiceRequest> for SqlGuardService<S>
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
        let suspicious = self.enabled && is_suspicious(req.path(), req.query_string());

        Box::pin(async move {
            if suspicious {
                tracing::warn!(
                    path = %req.path(),
                    method = %req.method(),
                    "Blocked request matching SQL injection pattern"
                );
                let res = json_error(StatusCode::BAD_REQUEST, "Invalid input detected", None);
                return Ok(req.into_response(res).map_into_right_body());
            }

            service.call(req).await.map(|res| res.map_into_left_body())
        })
    }
}

fn is_suspicious(path: &str, query: &str) -> bool {
    let path_hit = path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .any(|segment| match urlencoding::decode(segment) {
            Ok(decoded) => contains_sql_injection(&decoded),
            Err(_) => contains_sql_injection(segment),
        });

    path_hit
        || url::form_urlencoded::parse(query.as_bytes())
            .any(|(_, value)| contains_sql_injection(&value))
}
