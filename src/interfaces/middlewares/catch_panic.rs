use actix_web::{
    body::MessageBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error,
};
use futures::FutureExt;
use futures_util::future::{ok, LocalBoxFuture, Ready};
use std::{panic::AssertUnwindSafe, rc::Rc};

use crate::errors::AppError;

/// Turns a panicking handler into a 500 instead of a dropped connection
pub struct CatchPanic;

impl<S, B> Transform<S, ServiceRequest> for CatchPanic
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = CatchPanicService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(CatchPanicService {
            service: Rc::new(service),
        })
    }
}

pub struct CatchPanicService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for CatchPanicService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        // No `HttpRequest` clone across the call: the router needs sole ownership.
        let method = req.method().clone();
        let path = req.path().to_owned();

        Box::pin(async move {
            let outcome = AssertUnwindSafe(async move { service.call(req).await })
                .catch_unwind()
                .await;

            match outcome {
                Ok(res) => res,
                Err(_) => Err(AppError::InternalError(format!("handler panicked on {} {}", method, path)).into()),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{
        body::to_bytes,
        http::StatusCode,
        middleware::{NormalizePath, TrailingSlash},
        test, web, App, HttpResponse,
    };

    #[actix_rt::test]
    async fn panic_becomes_internal_error() {
        let app = test::init_service(
            App::new()
                .wrap(CatchPanic)
                .route(
                    "/boom",
                    web::get().to(|| async {
                        if true {
                            panic!("boom");
                        }
                        HttpResponse::Ok().finish()
                    }),
                )
                .route("/fine", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;

        let err = test::try_call_service(&app, test::TestRequest::get().uri("/boom").to_request())
            .await
            .unwrap_err();
        let res = err.error_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(res.into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"], "Internal server error");

        let res = test::call_service(&app, test::TestRequest::get().uri("/fine").to_request()).await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[actix_rt::test]
    async fn routing_with_path_params_survives_the_wrapper() {
        let app = test::init_service(
            App::new()
                .wrap(CatchPanic)
                .wrap(NormalizePath::new(TrailingSlash::Trim))
                .route(
                    "/items/{id}",
                    web::get().to(|id: web::Path<i32>| async move { HttpResponse::Ok().body(id.to_string()) }),
                ),
        )
        .await;

        let res = test::call_service(&app, test::TestRequest::get().uri("/items/42/").to_request()).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(test::read_body(res).await, "42");
    }
}
