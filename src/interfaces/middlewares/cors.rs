use actix_web::{
    body::{EitherBody, MessageBody},
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::{
        header::{self, HeaderMap, HeaderValue},
        Method, StatusCode,
    },
    Error, HttpResponse,
};
use futures_util::future::{ok, LocalBoxFuture, Ready};
use std::rc::Rc;

use crate::handlers::json_error::json_error;

const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
const ALLOWED_HEADERS: &str = "Origin, Content-Type, Accept, Authorization, X-Requested-With, If-None-Match";
const EXPOSED_HEADERS: &str = "Content-Length, ETag, Retry-After, X-RateLimit-Limit, X-RateLimit-Remaining";
const MAX_AGE_SECS: &str = "43200";

#[derive(Debug)]
struct CorsPolicy {
    origins: Vec<String>,
    allow_any: bool,
}

impl CorsPolicy {
    fn allows(&self, origin: &str) -> bool {
        self.allow_any || self.origins.iter().any(|o| o == origin)
    }
}

/// Allow-list CORS. A `*` entry is only honoured in development; elsewhere
/// it is ignored and only the explicit origins are accepted.
pub struct Cors {
    policy: Rc<CorsPolicy>,
}

impl Cors {
    pub fn new(origins: Vec<String>, development: bool) -> Self {
        let wildcard = origins.iter().any(|o| o == "*");
        if wildcard && !development {
            tracing::error!("CORS: wildcard origin ignored outside development");
        }

        Self {
            policy: Rc::new(CorsPolicy {
                origins: origins.into_iter().filter(|o| o != "*").collect(),
                allow_any: wildcard && development,
            }),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for Cors
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = CorsService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(CorsService {
            service: Rc::new(service),
            policy: Rc::clone(&self.policy),
        })
    }
}

pub struct CorsService<S> {
    service: Rc<S>,
    policy: Rc<CorsPolicy>,
}

impl<S, B> Service<ServiceRequest> for CorsService<S>
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
        let policy = Rc::clone(&self.policy);

        Box::pin(async move {
            let Some(origin) = req.headers().get(header::ORIGIN).cloned() else {
                return service.call(req).await.map(|res| res.map_into_left_body());
            };

            let allowed = origin.to_str().map(|o| policy.allows(o)).unwrap_or(false);
            if !allowed {
                tracing::warn!(
                    origin = ?origin,
                    method = %req.method(),
                    path = %req.path(),
                    "CORS: blocked request from unauthorized origin"
                );
                let res = json_error(
                    StatusCode::FORBIDDEN,
                    "CORS: Origin not allowed",
                    Some("Access denied from this origin"),
                );
                return Ok(req.into_response(res).map_into_right_body());
            }

            if req.method() == Method::OPTIONS {
                let mut res = HttpResponse::NoContent().finish();
                apply_cors_headers(res.headers_mut(), origin);
                return Ok(req.into_response(res).map_into_right_body());
            }

            let mut res = service.call(req).await?;
            apply_cors_headers(res.headers_mut(), origin);
            Ok(res.map_into_left_body())
        })
    }
}

fn apply_cors_headers(headers: &mut HeaderMap, origin: HeaderValue) {
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
    headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOWED_METHODS));
    headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(ALLOWED_HEADERS));
    headers.insert(header::ACCESS_CONTROL_EXPOSE_HEADERS, HeaderValue::from_static(EXPOSED_HEADERS));
    headers.insert(header::ACCESS_CONTROL_ALLOW_CREDENTIALS, HeaderValue::from_static("true"));
    headers.insert(header::ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static(MAX_AGE_SECS));
    headers.insert(header::VARY, HeaderValue::from_static("Origin"));
}
