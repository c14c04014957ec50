//! Route registration and lookup.
//!
//! # Responsibilities
//! - Decompose patterns and insert them into the radix tree
//! - Record every route in the registry, rejecting conflicts and duplicate names
//! - Resolve (method, path) to a route plus captured parameters
//! - Build URIs from route ids, names or handler identity
//!
//! # Design Decisions
//! - One tree for all methods; bindings are keyed by method at each node
//! - Registration takes `&mut self`, lookup takes `&self`: once the router is
//!   shared behind an `Arc` it is frozen and safe for concurrent `find`
//! - No process-wide default instance; callers own and pass the router
//! - Middleware is composed into the endpoint once, at registration

use std::sync::Arc;

use axum::http::Method;

use crate::context::Params;
use crate::handler::{compose, Handler, Middleware};
use crate::routing::error::{RouteError, RouteResult};
use crate::routing::group::Group;
use crate::routing::matcher::{self, Lookup, MatchResult};
use crate::routing::node::Tree;
use crate::routing::pattern;
use crate::routing::registry::{Route, RouteId, RouteRecord, RouteRegistry};
use crate::routing::uri;

/// Methods covered by [`Router::any`].
pub const ANY_METHODS: [Method; 9] = [
    Method::GET,
    Method::HEAD,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
    Method::OPTIONS,
    Method::CONNECT,
    Method::TRACE,
];

/// Radix-tree request router.
#[derive(Debug, Default)]
pub struct Router {
    tree: Tree,
    registry: RouteRegistry,
}

macro_rules! method_helpers {
    ($($name:ident => $method:expr),* $(,)?) => {
        $(
            #[doc = concat!("Register a `", stringify!($name), "` route without extra middleware.")]
            pub fn $name(&mut self, path: &str, handler: Handler) -> RouteResult<RouteId> {
                self.add($method, path, handler, &[])
            }
        )*
    };
}
pub(crate) use method_helpers;

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `method` on `pattern`, wrapped by `middleware`
    /// (first element outermost).
    pub fn add(
        &mut self,
        method: Method,
        pattern: &str,
        handler: Handler,
        middleware: &[Middleware],
    ) -> RouteResult<RouteId> {
        self.add_route(method, pattern, None, handler, middleware.to_vec())
    }

    /// Register and name a route in one step.
    pub fn add_named(
        &mut self,
        method: Method,
        pattern: &str,
        name: &str,
        handler: Handler,
        middleware: &[Middleware],
    ) -> RouteResult<RouteId> {
        self.add_route(method, pattern, Some(name.to_string()), handler, middleware.to_vec())
    }

    method_helpers! {
        get => Method::GET,
        head => Method::HEAD,
        post => Method::POST,
        put => Method::PUT,
        patch => Method::PATCH,
        delete => Method::DELETE,
        options => Method::OPTIONS,
    }

    /// Register the same handler for several methods. Stops at the first error;
    /// routes registered before it stay registered.
    pub fn on(
        &mut self,
        methods: &[Method],
        pattern: &str,
        handler: Handler,
        middleware: &[Middleware],
    ) -> RouteResult<Vec<RouteId>> {
        methods
            .iter()
            .map(|m| self.add(m.clone(), pattern, handler.clone(), middleware))
            .collect()
    }

    /// Register for every method in [`ANY_METHODS`].
    pub fn any(
        &mut self,
        pattern: &str,
        handler: Handler,
        middleware: &[Middleware],
    ) -> RouteResult<Vec<RouteId>> {
        self.on(&ANY_METHODS, pattern, handler, middleware)
    }

    /// Start a group rooted at `prefix` carrying `middleware`.
    pub fn group(&mut self, prefix: &str, middleware: &[Middleware]) -> Group<'_> {
        Group::new(self, pattern::join("", prefix), middleware.to_vec())
    }

    /// Name an already registered route.
    pub fn name_route(&mut self, id: RouteId, name: &str) -> RouteResult<()> {
        self.registry.assign_name(id, name).inspect_err(|e| {
            tracing::warn!(route = %id, name = %name, error = %e, "Route naming rejected");
        })
    }

    pub(crate) fn add_route(
        &mut self,
        method: Method,
        pattern: &str,
        name: Option<String>,
        handler: Handler,
        middleware: Vec<Middleware>,
    ) -> RouteResult<RouteId> {
        let pattern = pattern::normalize(pattern).into_owned();
        let parsed = pattern::parse(&pattern)?;
        if parsed.truncated {
            tracing::warn!(
                pattern = %pattern,
                "Tokens after the first wildcard are unreachable and ignored"
            );
        }

        if let Some(name) = &name {
            if self.registry.contains_name(name) {
                tracing::warn!(name = %name, pattern = %pattern, "Duplicate route name");
                return Err(RouteError::DuplicateName(name.clone()));
            }
        }

        let param_names: Arc<[Arc<str>]> = parsed.param_names().into();
        let has_wildcard = parsed.has_wildcard();
        let node = self.tree.insert(&parsed.segments);

        if let Err(existing) = self.tree.bind(node, method.clone(), self.registry.next_id()) {
            return self.rebind(existing, method, pattern, name, &handler, &middleware);
        }

        let endpoint = compose(&handler, &middleware);
        let route = Route {
            id: self.registry.next_id(),
            method,
            pattern,
            name,
            param_names,
            has_wildcard,
            handler,
            middleware: middleware.into(),
            endpoint,
        };
        tracing::debug!(
            method = %route.method,
            pattern = %route.pattern,
            name = ?route.name,
            middleware = route.middleware.len(),
            "Route registered"
        );
        self.registry.register(route)
    }

    /// The slot is taken. Identical registrations are idempotent, anything
    /// else is a conflict.
    fn rebind(
        &mut self,
        existing: RouteId,
        method: Method,
        pattern: String,
        name: Option<String>,
        handler: &Handler,
        middleware: &[Middleware],
    ) -> RouteResult<RouteId> {
        let same = self.registry.get(existing).is_some_and(|route| {
            route.handler.ptr_eq(handler)
                && route.middleware.len() == middleware.len()
                && route.middleware.iter().zip(middleware).all(|(a, b)| a.ptr_eq(b))
        });

        if !same {
            tracing::warn!(method = %method, pattern = %pattern, occupant = %existing, "Route conflict");
            return Err(RouteError::Conflict { method, pattern });
        }

        tracing::debug!(method = %method, pattern = %pattern, "Route already registered");
        if let Some(name) = name {
            self.name_route(existing, &name)?;
        }
        Ok(existing)
    }

    /// Resolve `method` + `path`. Captures are written to `params`, which is
    /// cleared first.
    pub fn find(&self, method: &Method, path: &str, params: &mut Params) -> Lookup<'_> {
        params.clear();
        match matcher::walk(&self.tree, method, path, params) {
            Ok(id) => match self.registry.get(id) {
                Some(route) => {
                    params.commit(path, route.param_names());
                    Lookup::Found(MatchResult::new(route))
                }
                None => Lookup::NotFound,
            },
            Err(allowed) if allowed.is_empty() => Lookup::NotFound,
            Err(allowed) => Lookup::MethodNotAllowed { allowed },
        }
    }

    pub fn route(&self, id: RouteId) -> Option<&Route> {
        self.registry.get(id)
    }

    pub fn route_by_name(&self, name: &str) -> Option<&Route> {
        self.registry.find_by_name(name)
    }

    /// All routes in registration order.
    pub fn routes(&self) -> &[Route] {
        self.registry.routes()
    }

    pub fn registry(&self) -> &RouteRegistry {
        &self.registry
    }

    pub fn uri_for(&self, id: RouteId, values: &[&str]) -> RouteResult<String> {
        let route = self
            .route(id)
            .ok_or_else(|| RouteError::UnknownRoute(id.to_string()))?;
        uri::build(route, values)
    }

    pub fn uri_for_name(&self, name: &str, values: &[&str]) -> RouteResult<String> {
        let route = self
            .route_by_name(name)
            .ok_or_else(|| RouteError::UnknownRoute(name.to_string()))?;
        uri::build(route, values)
    }

    /// Build a URI for the first route registered with this handler instance.
    pub fn uri_for_handler(&self, handler: &Handler, values: &[&str]) -> RouteResult<String> {
        let route = self
            .registry
            .find_by_handler(handler)
            .ok_or_else(|| RouteError::UnknownRoute(format!("{:?}", handler)))?;
        uri::build(route, values)
    }

    /// Route table as `{method, path, name}` records in registration order.
    pub fn export(&self) -> Vec<RouteRecord> {
        self.registry.records()
    }

    pub fn export_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.export())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn ok() -> Handler {
        Handler::new(|_| Ok(()))
    }

    fn lookup(router: &Router, method: Method, path: &str) -> (Option<RouteId>, Params) {
        let mut params = Params::new();
        let id = router.find(&method, path, &mut params).found().map(|m| m.id());
        (id, params)
    }

    #[test]
    fn test_add_and_find() {
        let mut router = Router::new();
        let id = router.get("/users/:id", ok()).unwrap();
        let (found, params) = lookup(&router, Method::GET, "/users/7");
        assert_eq!(found, Some(id));
        assert_eq!(params.get("id"), Some("7"));
    }

    #[test]
    fn test_pattern_is_normalized() {
        let mut router = Router::new();
        let id = router.get("health", ok()).unwrap();
        assert_eq!(router.route(id).unwrap().pattern(), "/health");
        assert_eq!(lookup(&router, Method::GET, "/health").0, Some(id));
    }

    #[test]
    fn test_conflict_on_different_handler() {
        let mut router = Router::new();
        router.get("/users/:id", ok()).unwrap();
        let err = router.get("/users/:uid", ok()).unwrap_err();
        assert_eq!(
            err,
            RouteError::Conflict {
                method: Method::GET,
                pattern: "/users/:uid".into()
            }
        );
        assert_eq!(router.routes().len(), 1);
    }

    #[test]
    fn test_same_handler_is_idempotent() {
        let mut router = Router::new();
        let handler = ok();
        let first = router.get("/a", handler.clone()).unwrap();
        let again = router.get("/a", handler).unwrap();
        assert_eq!(first, again);
        assert_eq!(router.routes().len(), 1);
    }

    #[test]
    fn test_renamed_param_uses_its_own_name() {
        let mut router = Router::new();
        router.get("/users/:id", ok()).unwrap();
        router.post("/users/:uid", ok()).unwrap();
        let (_, params) = lookup(&router, Method::POST, "/users/5");
        assert_eq!(params.get("uid"), Some("5"));
        assert_eq!(params.get("id"), None);
    }

    #[test]
    fn test_any_registers_every_method() {
        let mut router = Router::new();
        let ids = router.any("/ping", ok(), &[]).unwrap();
        assert_eq!(ids.len(), ANY_METHODS.len());
        assert!(lookup(&router, Method::DELETE, "/ping").0.is_some());
        assert!(lookup(&router, Method::OPTIONS, "/ping").0.is_some());
    }

    #[test]
    fn test_method_not_allowed_lists_methods() {
        let mut router = Router::new();
        router.get("/items", ok()).unwrap();
        router.post("/items", ok()).unwrap();
        let mut params = Params::new();
        match router.find(&Method::DELETE, "/items", &mut params) {
            Lookup::MethodNotAllowed { allowed } => {
                assert_eq!(allowed, vec![Method::GET, Method::POST]);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(
            router.find(&Method::GET, "/missing", &mut params),
            Lookup::NotFound
        ));
    }

    #[test]
    fn test_endpoint_runs_route_middleware() {
        let mut router = Router::new();
        let teapot = Middleware::before(|ctx| {
            ctx.set_status(StatusCode::IM_A_TEAPOT);
            Ok(())
        });
        router.add(Method::GET, "/tea", ok(), &[teapot]).unwrap();

        let mut ctx = crate::context::Context::new();
        let mut params = Params::new();
        let matched = router.find(&Method::GET, "/tea", &mut params).found().unwrap();
        assert_eq!(matched.middleware().len(), 1);
        matched.endpoint().call(&mut ctx).unwrap();
        assert_eq!(ctx.status(), StatusCode::IM_A_TEAPOT);
    }

    #[test]
    fn test_uri_for_handler_and_unknown() {
        let mut router = Router::new();
        let show = ok();
        router.get("/posts/:slug", show.clone()).unwrap();
        assert_eq!(router.uri_for_handler(&show, &["hi"]).unwrap(), "/posts/hi");
        assert!(matches!(
            router.uri_for_handler(&ok(), &[]),
            Err(RouteError::UnknownRoute(_))
        ));
        assert!(matches!(
            router.uri_for_name("nope", &[]),
            Err(RouteError::UnknownRoute(_))
        ));
    }

    #[test]
    fn test_export_json() {
        let mut router = Router::new();
        router.add_named(Method::GET, "/", "home", ok(), &[]).unwrap();
        router.post("/users", ok()).unwrap();
        let json = router.export_json().unwrap();
        let records: Vec<RouteRecord> = serde_json::from_str(&json).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name.as_deref(), Some("home"));
        assert_eq!(records[1].method, "POST");
    }
}
