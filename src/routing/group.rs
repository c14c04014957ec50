//! Route groups.
//!
//! A group is a prefix plus a middleware chain. It owns no routes: every
//! registration is forwarded to the router with the prefix prepended and
//! the group's chain placed ahead of any per-route middleware.

use axum::http::Method;

use crate::handler::{Handler, Middleware};
use crate::routing::error::RouteResult;
use crate::routing::pattern;
use crate::routing::registry::RouteId;
use crate::routing::router::{method_helpers, Router, ANY_METHODS};

/// Registration scope with an inherited prefix and middleware chain.
#[derive(Debug)]
pub struct Group<'r> {
    router: &'r mut Router,
    prefix: String,
    middleware: Vec<Middleware>,
}

impl<'r> Group<'r> {
    pub(crate) fn new(router: &'r mut Router, prefix: String, middleware: Vec<Middleware>) -> Self {
        Self {
            router,
            prefix,
            middleware,
        }
    }

    /// Effective prefix, ancestors included.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Effective chain, ancestors first.
    pub fn middleware(&self) -> &[Middleware] {
        &self.middleware
    }

    /// Nested group: prefixes and chains concatenate.
    pub fn group(&mut self, prefix: &str, middleware: &[Middleware]) -> Group<'_> {
        let chain = self.middleware.iter().chain(middleware).cloned().collect();
        Group::new(&mut *self.router, pattern::join(&self.prefix, prefix), chain)
    }

    /// Append middleware. Only routes registered afterwards see it.
    pub fn use_middleware(&mut self, middleware: &[Middleware]) {
        self.middleware.extend_from_slice(middleware);
    }

    pub fn add(
        &mut self,
        method: Method,
        path: &str,
        handler: Handler,
        middleware: &[Middleware],
    ) -> RouteResult<RouteId> {
        self.forward(method, path, None, handler, middleware)
    }

    pub fn add_named(
        &mut self,
        method: Method,
        path: &str,
        name: &str,
        handler: Handler,
        middleware: &[Middleware],
    ) -> RouteResult<RouteId> {
        self.forward(method, path, Some(name.to_string()), handler, middleware)
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

    pub fn any(
        &mut self,
        path: &str,
        handler: Handler,
        middleware: &[Middleware],
    ) -> RouteResult<Vec<RouteId>> {
        ANY_METHODS
            .iter()
            .map(|m| self.add(m.clone(), path, handler.clone(), middleware))
            .collect()
    }

    fn forward(
        &mut self,
        method: Method,
        path: &str,
        name: Option<String>,
        handler: Handler,
        middleware: &[Middleware],
    ) -> RouteResult<RouteId> {
        let pattern = pattern::join(&self.prefix, path);
        let chain = self.middleware.iter().chain(middleware).cloned().collect();
        self.router.add_route(method, &pattern, name, handler, chain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok() -> Handler {
        Handler::new(|_| Ok(()))
    }

    fn mw() -> Middleware {
        Middleware::new(|next| next)
    }

    #[test]
    fn test_prefix_composition() {
        let mut router = Router::new();
        let mut api = router.group("/api", &[]);
        let mut v1 = api.group("v1/", &[]);
        assert_eq!(v1.prefix(), "/api/v1/");
        let id = v1.get("/users", ok()).unwrap();
        let root = v1.get("", ok()).unwrap();
        assert_eq!(router.route(id).unwrap().pattern(), "/api/v1/users");
        assert_eq!(router.route(root).unwrap().pattern(), "/api/v1/");
    }

    #[test]
    fn test_chain_order_and_per_route_middleware() {
        let (a, b, c) = (mw(), mw(), mw());
        let mut router = Router::new();
        let mut api = router.group("/api", &[a.clone()]);
        let mut v1 = api.group("/v1", &[b.clone()]);
        let id = v1.add(Method::GET, "/x", ok(), &[c.clone()]).unwrap();

        let chain = router.route(id).unwrap().middleware();
        assert_eq!(chain.len(), 3);
        assert!(chain[0].ptr_eq(&a));
        assert!(chain[1].ptr_eq(&b));
        assert!(chain[2].ptr_eq(&c));
    }

    #[test]
    fn test_use_is_not_retroactive() {
        let late = mw();
        let mut router = Router::new();
        let mut group = router.group("/g", &[]);
        let before = group.get("/before", ok()).unwrap();
        group.use_middleware(&[late.clone()]);
        let after = group.get("/after", ok()).unwrap();

        assert!(router.route(before).unwrap().middleware().is_empty());
        assert!(router.route(after).unwrap().middleware()[0].ptr_eq(&late));
    }

    #[test]
    fn test_named_group_route() {
        let mut router = Router::new();
        let mut admin = router.group("/admin", &[]);
        admin.add_named(Method::GET, "/users/:id", "admin.user", ok(), &[]).unwrap();
        assert_eq!(router.uri_for_name("admin.user", &["3"]).unwrap(), "/admin/users/3");
    }
}
