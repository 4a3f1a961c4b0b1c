//! HTTP response builders.

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Serialize;

pub type Body = Full<Bytes>;

pub type HttpResponse = Response<Body>;

/// Build a JSON response with the given status code and body.
pub fn json<T: Serialize>(status: StatusCode, body: &T) -> crate::Result<HttpResponse> {
    let json = serde_json::to_string(body)?;
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(json)))
        .unwrap())
}

/// Build a 200 OK JSON response.
pub fn ok<T: Serialize>(body: &T) -> crate::Result<HttpResponse> {
    json(StatusCode::OK, body)
}

/// Build a 201 Created JSON response.
pub fn created<T: Serialize>(body: &T) -> crate::Result<HttpResponse> {
    json(StatusCode::CREATED, body)
}

pub fn no_content() -> HttpResponse {
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .body(Full::new(Bytes::new()))
        .unwrap()
}

/// `{"error": message}` with the given status.
pub fn error_body(status: StatusCode, message: &str) -> HttpResponse {
    let body = serde_json::json!({ "error": message });
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap()
}
