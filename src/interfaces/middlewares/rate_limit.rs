use actix_web::{
    body::{EitherBody, MessageBody},
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderMap, HeaderName, HeaderValue, RETRY_AFTER},
    Error, ResponseError,
};
use futures_util::future::{ok, LocalBoxFuture, Ready};
use std::{rc::Rc, sync::Arc};

use crate::{
    errors::AppError,
    limiter::rate_limiter::{RateDecision, RateLimiter},
    utils::get_client_ip::get_client_ip,
};

const X_RATELIMIT_LIMIT: &str = "x-ratelimit-limit";
const X_RATELIMIT_REMAINING: &str = "x-ratelimit-remaining";

/// Per-client-IP request budget; rejected requests get 429 with `Retry-After`
pub struct RateLimit {
    limiter: Arc<dyn RateLimiter>,
    trust_forwarded: bool,
}

impl RateLimit {
    pub fn new(limiter: Arc<dyn RateLimiter>, trust_forwarded: bool) -> Self {
        Self { limiter, trust_forwarded }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(RateLimitService {
            service: Rc::new(service),
            limiter: Arc::clone(&self.limiter),
            trust_forwarded: self.trust_forwarded,
        })
    }
}

pub struct RateLimitService<S> {
    service: Rc<S>,
    limiter: Arc<dyn RateLimiter>,
    trust_forwarded: bool,
}

impl<S, B> Service<ServiceRequest> for RateLimitService<S>
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
        let limiter = Arc::clone(&self.limiter);
        let client_ip = get_client_ip(req.request(), self.trust_forwarded);

        Box::pin(async move {
            let decision = limiter.check(&client_ip).await;

            if !decision.allowed {
                tracing::warn!(
                    ip = %client_ip,
                    path = %req.path(),
                    "Rate limit exceeded"
                );
                let mut res = AppError::RateLimited.error_response();
                apply_limit_headers(res.headers_mut(), &decision);
                if let Some(retry_after) = decision.retry_after {
                    res.headers_mut().insert(RETRY_AFTER, HeaderValue::from(retry_after));
                }
                return Ok(req.into_response(res).map_into_right_body());
            }

            let mut res = service.call(req).await?;
            apply_limit_headers(res.headers_mut(), &decision);
            Ok(res.map_into_left_body())
        })
    }
}

fn apply_limit_headers(headers: &mut HeaderMap, decision: &RateDecision) {
    headers.insert(HeaderName::from_static(X_RATELIMIT_LIMIT), HeaderValue::from(decision.limit));
    headers.insert(HeaderName::from_static(X_RATELIMIT_REMAINING), HeaderValue::from(decision.remaining));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limiter::rate_limiter::SlidingWindowLimiter;
    use actix_web::{http::StatusCode, test, web, App, HttpResponse};
    use std::time::Duration;

    #[actix_rt::test]
    async fn rejects_once_the_budget_is_spent() {
        let limiter: Arc<dyn RateLimiter> = Arc::new(SlidingWindowLimiter::new(2, Duration::from_secs(60)));
        let app = test::init_service(
            App::new()
                .wrap(RateLimit::new(limiter, false))
                .route("/", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;

        for remaining in ["1", "0"] {
            let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
            assert_eq!(res.status(), StatusCode::OK);
            assert_eq!(res.headers().get("x-ratelimit-remaining").unwrap(), remaining);
        }

        let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(res.headers().contains_key(RETRY_AFTER));
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["error"], "Rate limit exceeded. Please try again later.");
    }
}
