//! Radix-tree HTTP request router.
//!
//! Static segments, `:name` parameters and trailing `*` wildcards are stored
//! in one compressed prefix tree. Lookups are deterministic
//! (static > param > wildcard, with backtracking) and distinguish
//! "no such path" from "path exists, method not allowed".
//!
//! ```text
//!   Router ── add / group / use ──▶ radix tree + route registry
//!     │
//!     ├── find(method, path, &mut Params) ─▶ Found | MethodNotAllowed | NotFound
//!     ├── uri_for / uri_for_name / uri_for_handler
//!     └── export (method, path, name)
//!
//!   ContextPool ── acquire / release ──▶ reusable per-request Context
//! ```

pub mod config;
pub mod context;
pub mod handler;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::RouterConfig;
pub use context::{Context, ContextPool, Params, PooledContext};
pub use handler::{compose, Handler, HandlerError, HandlerResult, Middleware};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{
    Group, Lookup, MatchResult, Route, RouteError, RouteId, RouteRecord, RouteResult, Router,
    ANY_METHODS,
};
