//! Startup orchestration.
//!
//! # Responsibilities
//! - Turn `[[routes]]` entries into a `Router` of static responders
//! - Size the context pool from configuration
//!
//! # Design Decisions
//! - Fail fast: any registration error is fatal and names the offending entry
//! - One handler instance per entry, shared by every method it registers

use std::sync::Arc;

use axum::http::{header, HeaderValue, StatusCode};
use thiserror::Error;

use crate::config::{ConfigError, PoolConfig, RouteConfig};
use crate::context::{ContextPool, Params};
use crate::handler::Handler;
use crate::routing::{RouteError, Router};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("routes[{index}]: unknown method '{method}'")]
    Method { index: usize, method: String },

    #[error("routes[{index}]: {status} is not a valid response status")]
    Status { index: usize, status: u16 },

    #[error("routes[{index}]: {source}")]
    Route {
        index: usize,
        #[source]
        source: RouteError,
    },

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

/// Register every configured route on a fresh router.
pub fn build_router(routes: &[RouteConfig]) -> Result<Router, StartupError> {
    let mut router = Router::new();

    for (index, entry) in routes.iter().enumerate() {
        let methods = entry
            .methods()
            .map_err(|method| StartupError::Method { index, method })?;
        let status = StatusCode::from_u16(entry.status).map_err(|_| StartupError::Status {
            index,
            status: entry.status,
        })?;

        let handler = static_responder(status, &entry.body);
        let ids = router
            .on(&methods, &entry.path, handler, &[])
            .map_err(|source| StartupError::Route { index, source })?;

        if let (Some(name), Some(&first)) = (&entry.name, ids.first()) {
            router
                .name_route(first, name)
                .map_err(|source| StartupError::Route { index, source })?;
        }
    }

    tracing::info!(routes = router.routes().len(), "Router built from configuration");
    Ok(router)
}

/// Handler answering `status` with `template` rendered against the captures.
pub fn static_responder(status: StatusCode, template: &str) -> Handler {
    let template: Arc<str> = Arc::from(template);
    Handler::new(move |ctx| {
        let body = render_body(&template, ctx.params());
        ctx.set_status(status);
        ctx.insert_header(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        ctx.write_str(&body);
        Ok(())
    })
}

/// Replace `{name}` with the captured value. Unknown names stay verbatim.
pub fn render_body(template: &str, params: &Params) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                let name = &after[..close];
                match params.get(name) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

pub fn build_pool(config: &PoolConfig) -> ContextPool {
    ContextPool::with_prewarm(config.max_idle, config.prewarm)
}
