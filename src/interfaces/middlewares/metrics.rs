use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error,
};
use futures_util::future::{ok, LocalBoxFuture, Ready};
use std::{rc::Rc, sync::Arc, time::Instant};

use crate::metrics::MetricsRegistry;

/// Label used for requests that matched no route, keeping label cardinality bounded
const UNMATCHED_ROUTE: &str = "unmatched";

/// Records count and latency of every request, labelled by route pattern
pub struct RecordMetrics {
    registry: Arc<MetricsRegistry>,
}

impl RecordMetrics {
    pub fn new(registry: Arc<MetricsRegistry>) -> Self {
        Self { registry }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RecordMetrics
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RecordMetricsService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(RecordMetricsService {
            service: Rc::new(service),
            registry: Arc::clone(&self.registry),
        })
    }
}

pub struct RecordMetricsService<S> {
    service: Rc<S>,
    registry: Arc<MetricsRegistry>,
}

impl<S, B> Service<ServiceRequest> for RecordMetricsService<S>
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
        let registry = Arc::clone(&self.registry);
        let method = req.method().to_string();
        let started = Instant::now();

        Box::pin(async move {
            let res = service.call(req).await?;

            let route = res
                .request()
                .match_pattern()
                .unwrap_or_else(|| UNMATCHED_ROUTE.to_string());
            registry.record_request(&route, &method, res.status().as_u16(), started.elapsed());

            Ok(res)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, web, App, HttpResponse};

    #[actix_rt::test]
    async fn labels_by_route_pattern() {
        let registry = Arc::new(MetricsRegistry::new());
        let app = test::init_service(
            App::new()
                .wrap(RecordMetrics::new(Arc::clone(&registry)))
                .route("/projects/{id}", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;

        for id in [1, 2] {
            let req = test::TestRequest::get().uri(&format!("/projects/{}", id)).to_request();
            test::call_service(&app, req).await;
        }
        test::call_service(&app, test::TestRequest::get().uri("/nope").to_request()).await;

        assert_eq!(registry.request_count("/projects/{id}", "GET", 200), 2);
        assert_eq!(registry.request_count(UNMATCHED_ROUTE, "GET", 404), 1);
    }
}
