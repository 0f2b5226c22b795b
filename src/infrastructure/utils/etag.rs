use actix_web::{
    http::header::{self, ContentType},
    HttpRequest, HttpResponse,
};
use serde::Serialize;

use crate::errors::AppError;

/// Quoted MD5 hex digest of the serialized body
pub fn compute_etag(body: &[u8]) -> String {
    format!("\"{:x}\"", md5::compute(body))
}

pub fn etag_matches(req: &HttpRequest, etag: &str) -> bool {
    req.headers()
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .any(|candidate| candidate == "*" || candidate == etag || candidate.trim_start_matches("W/") == etag)
        })
        .unwrap_or(false)
}

/// Serializes `value` once, answering 304 when the client already holds it
pub fn json_with_etag<T: Serialize>(req: &HttpRequest, value: &T) -> Result<HttpResponse, AppError> {
    let body = serde_json::to_vec(value)
        .map_err(|e| AppError::InternalError(format!("Failed to serialize response: {}", e)))?;
    let etag = compute_etag(&body);

    if etag_matches(req, &etag) {
        return Ok(HttpResponse::NotModified()
            .insert_header((header::ETAG, etag))
            .finish());
    }

    Ok(HttpResponse::Ok()
        .insert_header((header::ETAG, etag))
        .insert_header(ContentType::json())
        .body(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test::TestRequest};

    #[test]
    fn etag_is_quoted_md5() {
        // md5("[]") = d751713988987e9331980363e24189ce
        assert_eq!(compute_etag(b"[]"), "\"d751713988987e9331980363e24189ce\"");
    }

    #[test]
    fn matching_if_none_match_yields_304() {
        let etag = compute_etag(b"[1,2,3]");
        let req = TestRequest::default()
            .insert_header((header::IF_NONE_MATCH, etag.clone()))
            .to_http_request();

        let res = json_with_etag(&req, &vec![1, 2, 3]).unwrap();
        assert_eq!(res.status(), StatusCode::NOT_MODIFIED);
        assert_eq!(res.headers().get(header::ETAG).unwrap().to_str().unwrap(), etag);
    }

    #[test]
    fn stale_etag_returns_body() {
        let req = TestRequest::default()
            .insert_header((header::IF_NONE_MATCH, "\"stale\""))
            .to_http_request();

        let res = json_with_etag(&req, &vec![1, 2, 3]).unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.headers().contains_key(header::ETAG));
    }
}
