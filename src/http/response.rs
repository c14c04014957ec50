//! Lookup outcome and handler result to HTTP response mapping.
//!
//! # Design Decisions
//! - 405 responses always carry an `Allow` header listing registered methods
//! - Internal handler errors are logged in full but answered with a generic body
//! - Bodies over the configured limit get 413, other read failures 400

use std::error::Error as StdError;

use axum::body::Body;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::context::Context;
use crate::handler::HandlerError;

/// Turn the response written into `ctx` into an HTTP response.
pub fn from_context(ctx: &mut Context) -> Response {
    let (status, headers, body) = ctx.take_response();
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

pub fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not Found").into_response()
}

/// 405 with `Allow` set to the comma-separated method list.
pub fn method_not_allowed(allowed: &[Method]) -> Response {
    let allow = allow_header(allowed);
    let mut response = (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed").into_response();
    if let Ok(value) = HeaderValue::from_str(&allow) {
        response.headers_mut().insert(header::ALLOW, value);
    }
    response
}

pub fn allow_header(allowed: &[Method]) -> String {
    allowed
        .iter()
        .map(Method::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Response for a request body that could not be buffered.
pub fn body_error(err: &axum::Error, request_id: &str) -> Response {
    if exceeds_limit(err) {
        tracing::debug!(request_id = %request_id, "Request body over limit");
        return (StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large").into_response();
    }
    tracing::debug!(request_id = %request_id, error = %err, "Failed to read request body");
    (StatusCode::BAD_REQUEST, "Bad Request").into_response()
}

/// The body limiter reports overflow as a "length limit exceeded" error
/// somewhere in the source chain.
fn exceeds_limit(err: &axum::Error) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(e) = current {
        if e.to_string().contains("length limit exceeded") {
            return true;
        }
        current = e.source();
    }
    false
}

pub fn from_error(err: &HandlerError, request_id: &str) -> Response {
    let status = err.status_code();
    match err {
        HandlerError::Status { message, .. } => {
            tracing::debug!(request_id = %request_id, status = %status, message = %message, "Handler rejected request");
            (status, message.clone()).into_response()
        }
        HandlerError::Internal(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Handler failed");
            (status, "Internal Server Error").into_response()
        }
    }
}
