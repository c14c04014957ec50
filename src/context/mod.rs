//! Request-scoped state.
//!
//! # Data Flow
//! ```text
//! Request arrives (dispatch layer)
//!     → pool.rs (check out a Context, allocating only if none is idle)
//!     → Context::prepare (method, path, query), headers, buffered request body
//!     → Router::find writes captures into Context::params_mut()
//!     → handler chain reads params, writes status/headers/body
//!     → dispatch layer takes the response
//!     → guard drop: Context::reset, back to the pool
//! ```
//!
//! # Design Decisions
//! - A checked-out Context is owned by exactly one request
//! - Reset clears values but keeps buffer capacity

pub mod params;
pub mod pool;

pub use params::Params;
pub use pool::{ContextPool, PooledContext};

use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};

use crate::routing::RouteId;

/// Per-request state handed to handlers.
#[derive(Debug)]
pub struct Context {
    method: Method,
    path: String,
    query: String,
    request_headers: HeaderMap,
    request_body: Vec<u8>,
    params: Params,
    route: Option<RouteId>,
    status: StatusCode,
    response_headers: HeaderMap,
    body: Vec<u8>,
}

impl Context {
    pub fn new() -> Self {
        Self {
            method: Method::GET,
            path: String::new(),
            query: String::new(),
            request_headers: HeaderMap::new(),
            request_body: Vec::new(),
            params: Params::new(),
            route: None,
            status: StatusCode::OK,
            response_headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    /// Load the request line into reused buffers.
    pub fn prepare(&mut self, method: &Method, path: &str, query: Option<&str>) {
        self.method = method.clone();
        self.path.clear();
        self.path.push_str(path);
        self.query.clear();
        if let Some(query) = query {
            self.query.push_str(query);
        }
    }

    /// Clear everything a previous request left behind.
    pub fn reset(&mut self) {
        self.method = Method::GET;
        self.path.clear();
        self.query.clear();
        self.request_headers.clear();
        self.request_body.clear();
        self.params.clear();
        self.route = None;
        self.status = StatusCode::OK;
        self.response_headers.clear();
        self.body.clear();
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn request_headers(&self) -> &HeaderMap {
        &self.request_headers
    }

    pub fn request_headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.request_headers
    }

    /// Buffered request payload. Empty for bodiless requests.
    pub fn request_body(&self) -> &[u8] {
        &self.request_body
    }

    /// Replace the request payload, reusing the existing buffer.
    pub fn set_request_body(&mut self, bytes: &[u8]) {
        self.request_body.clear();
        self.request_body.extend_from_slice(bytes);
    }

    #[cfg(test)]
    pub(crate) fn request_body_capacity(&self) -> usize {
        self.request_body.capacity()
    }

    /// Captured value for a `:name` or wildcard segment.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut Params {
        &mut self.params
    }

    /// Path and params borrowed together, for lookups that write captures.
    pub fn lookup_parts(&mut self) -> (&Method, &str, &mut Params) {
        (&self.method, &self.path, &mut self.params)
    }

    /// The route that matched this request, if any.
    pub fn route(&self) -> Option<RouteId> {
        self.route
    }

    pub fn set_route(&mut self, id: RouteId) {
        self.route = Some(id);
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    pub fn insert_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.response_headers.insert(name, value);
    }

    pub fn response_headers(&self) -> &HeaderMap {
        &self.response_headers
    }

    pub fn write(&mut self, bytes: &[u8]) {
        self.body.extend_from_slice(bytes);
    }

    pub fn write_str(&mut self, text: &str) {
        self.write(text.as_bytes());
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Move the response out, leaving empty response state behind.
    pub fn take_response(&mut self) -> (StatusCode, HeaderMap, Vec<u8>) {
        let status = std::mem::replace(&mut self.status, StatusCode::OK);
        (
            status,
            std::mem::take(&mut self.response_headers),
            std::mem::take(&mut self.body),
        )
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;

    #[test]
    fn test_prepare_and_reset() {
        let mut ctx = Context::new();
        ctx.prepare(&Method::POST, "/users", Some("page=2"));
        ctx.set_status(StatusCode::CREATED);
        ctx.insert_header(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        ctx.write_str("created");
        ctx.set_route(RouteId(1));
        ctx.set_request_body(b"{\"name\":\"ada\"}");

        assert_eq!(ctx.method(), &Method::POST);
        assert_eq!(ctx.request_body(), b"{\"name\":\"ada\"}");
        assert_eq!(ctx.path(), "/users");
        assert_eq!(ctx.query(), "page=2");
        assert_eq!(ctx.route(), Some(RouteId(1)));

        ctx.reset();
        assert_eq!(ctx.path(), "");
        assert_eq!(ctx.query(), "");
        assert_eq!(ctx.status(), StatusCode::OK);
        assert!(ctx.response_headers().is_empty());
        assert!(ctx.body().is_empty());
        assert!(ctx.route().is_none());
        assert!(ctx.request_body().is_empty());
    }

    #[test]
    fn test_take_response() {
        let mut ctx = Context::new();
        ctx.set_status(StatusCode::ACCEPTED);
        ctx.write_str("queued");
        let (status, _, body) = ctx.take_response();
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body, b"queued");
        assert_eq!(ctx.status(), StatusCode::OK);
        assert!(ctx.body().is_empty());
    }
}
