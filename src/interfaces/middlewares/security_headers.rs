use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{self, HeaderName, HeaderValue},
    Error,
};
use futures_util::future::{ok, LocalBoxFuture, Ready};
use std::rc::Rc;

const HSTS: &str = "max-age=31536000; includeSubDomains; preload";

/// Adds the browser hardening headers to every response
pub struct SecurityHeaders {
    hsts: bool,
    csp: Option<HeaderValue>,
}

impl SecurityHeaders {
    pub fn new(hsts: bool, csp: Option<&str>) -> Self {
        let csp = csp.and_then(|policy| match HeaderValue::from_str(policy) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!(error = %e, "Ignoring Content-Security-Policy that is not a valid header value");
                None
            }
        });
        Self { hsts, csp }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SecurityHeaders
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = SecurityHeadersService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(SecurityHeadersService {
            service: Rc::new(service),
            hsts: self.hsts,
            csp: self.csp.clone(),
        })
    }
}

pub struct SecurityHeadersService<S> {
    service: Rc<S>,
    hsts: bool,
    csp: Option<HeaderValue>,
}

impl<S, B> Service<ServiceRequest> for SecurityHeadersService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let hsts = self.hsts;
        let csp = self.csp.clone();

        Box::pin(async move {
            let mut res = service.call(req).await?;
            let headers = res.headers_mut();

            headers.insert(header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
            headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
            headers.insert(header::X_XSS_PROTECTION, HeaderValue::from_static("1; mode=block"));
            headers.insert(
                header::REFERRER_POLICY,
                HeaderValue::from_static("strict-origin-when-cross-origin"),
            );
            headers.insert(
                HeaderName::from_static("permissions-policy"),
                HeaderValue::from_static("geolocation=(), microphone=(), camera=()"),
            );
            if hsts {
                headers.insert(header::STRICT_TRANSPORT_SECURITY, HeaderValue::from_static(HSTS));
            }
            if let Some(csp) = csp {
                headers.insert(header::CONTENT_SECURITY_POLICY, csp);
            }

            Ok(res)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, web, App, HttpResponse};

    #[actix_rt::test]
    async fn sets_hardening_headers() {
        let app = test::init_service(
            App::new()
                .wrap(SecurityHeaders::new(true, Some("default-src 'self'")))
                .route("/", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;

        let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        let headers = res.headers();
        assert_eq!(headers.get(header::X_CONTENT_TYPE_OPTIONS).unwrap(), "nosniff");
        assert_eq!(headers.get(header::X_FRAME_OPTIONS).unwrap(), "DENY");
        assert_eq!(headers.get(header::STRICT_TRANSPORT_SECURITY).unwrap(), HSTS);
        assert_eq!(headers.get(header::CONTENT_SECURITY_POLICY).unwrap(), "default-src 'self'");
        assert!(headers.contains_key("permissions-policy"));
    }

    #[actix_rt::test]
    async fn hsts_is_optional() {
        let app = test::init_service(
            App::new()
                .wrap(SecurityHeaders::new(false, None))
                .route("/", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;

        let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert!(!res.headers().contains_key(header::STRICT_TRANSPORT_SECURITY));
        assert!(!res.headers().contains_key(header::CONTENT_SECURITY_POLICY));
    }
}
