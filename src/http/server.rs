//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create the Axum service with a single catch-all fallback
//! - Wire up middleware (request ID, timeout, body limit, tracing)
//! - Buffer the request body into the context before dispatch
//! - Dispatch every request through the radix router with a pooled context
//! - Record lookup and request metrics

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::Response,
    Router as AxumRouter,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::RouterConfig;
use crate::context::{Context, ContextPool};
use crate::http::request::{propagate_request_id_layer, request_id, set_request_id_layer};
use crate::http::response;
use crate::lifecycle::shutdown;
use crate::observability::metrics;
use crate::routing::{Lookup, Router};

/// Shared state injected into the dispatch handler.
#[derive(Clone, Debug)]
pub struct AppState {
    pub router: Arc<Router>,
    pub pool: Arc<ContextPool>,
    pub max_body_bytes: usize,
}

/// HTTP front end for a frozen router.
pub struct HttpServer {
    app: AxumRouter,
    state: AppState,
}

impl HttpServer {
    pub fn new(router: Arc<Router>, pool: Arc<ContextPool>, config: &RouterConfig) -> Self {
        let state = AppState {
            router,
            pool,
            max_body_bytes: config.listener.max_body_bytes,
        };
        let app = Self::build_app(config, state.clone());
        Self { app, state }
    }

    #[allow(deprecated)]
    fn build_app(config: &RouterConfig, state: AppState) -> AxumRouter {
        AxumRouter::new()
            .fallback(dispatch)
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.listener.max_body_bytes))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// The assembled service, for embedding or in-process testing.
    pub fn app(&self) -> AxumRouter {
        self.app.clone()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Serve until `shutdown_rx` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            routes = self.state.router.routes().len(),
            "HTTP server starting"
        );

        axum::serve(listener, self.app.into_make_service())
            .with_graceful_shutdown(shutdown::wait(shutdown_rx))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let (parts, body) = request.into_parts();

    let body = match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            let request_id = request_id(&parts.headers).unwrap_or("unknown");
            let response = response::body_error(&e, request_id);
            metrics::record_request(parts.method.as_str(), response.status().as_u16(), "none", start);
            return response;
        }
    };

    let mut ctx = state.pool.acquire();
    ctx.prepare(&parts.method, parts.uri.path(), parts.uri.query());
    ctx.set_request_body(&body);
    *ctx.request_headers_mut() = parts.headers;

    let (response, route) = resolve(&state.router, &mut ctx);
    metrics::record_request(
        parts.method.as_str(),
        response.status().as_u16(),
        route.as_deref().unwrap_or("none"),
        start,
    );
    response
}

/// Look up the route and run its endpoint. Returns the route label for metrics.
fn resolve(router: &Router, ctx: &mut Context) -> (Response, Option<String>) {
    let request_id = request_id(ctx.request_headers()).unwrap_or("unknown").to_string();
    let (method, path, params) = ctx.lookup_parts();
    let lookup = router.find(method, path, params);
    metrics::record_lookup(lookup.outcome());

    match lookup {
        Lookup::Found(found) => {
            ctx.set_route(found.id());
            tracing::debug!(
                request_id = %request_id,
                method = %ctx.method(),
                path = %ctx.path(),
                route = %found.route().label(),
                "Route matched"
            );
            let response = match found.endpoint().call(ctx) {
                Ok(()) => response::from_context(ctx),
                Err(e) => response::from_error(&e, &request_id),
            };
            (response, Some(found.route().label()))
        }
        Lookup::MethodNotAllowed { allowed } => {
            tracing::debug!(
                request_id = %request_id,
                method = %ctx.method(),
                path = %ctx.path(),
                allow = %response::allow_header(&allowed),
                "Method not allowed"
            );
            (response::method_not_allowed(&allowed), None)
        }
        Lookup::NotFound => {
            tracing::debug!(request_id = %request_id, path = %ctx.path(), "No route matched");
            (response::not_found(), None)
        }
    }
}
