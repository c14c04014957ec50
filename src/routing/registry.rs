//! Route registry.
//!
//! # Responsibilities
//! - Keep every registered route in registration order
//! - Index named routes for reverse lookups
//! - Export the route table as `{method, path, name}` records
//!
//! # Design Decisions
//! - A `RouteId` is the registration index; it never changes
//! - Names are unique; a duplicate is rejected and the first holder stays

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use axum::http::Method;
use serde::{Deserialize, Serialize};

use crate::handler::{Handler, Middleware};
use crate::routing::error::{RouteError, RouteResult};

/// Stable registration index of a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteId(pub(crate) usize);

impl RouteId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A registered route.
#[derive(Clone)]
pub struct Route {
    pub(crate) id: RouteId,
    pub(crate) method: Method,
    pub(crate) pattern: String,
    pub(crate) name: Option<String>,
    pub(crate) param_names: Arc<[Arc<str>]>,
    pub(crate) has_wildcard: bool,
    pub(crate) handler: Handler,
    pub(crate) middleware: Arc<[Middleware]>,
    /// Handler wrapped by the middleware chain, composed once at registration.
    pub(crate) endpoint: Handler,
}

impl Route {
    pub fn id(&self) -> RouteId {
        self.id
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The full pattern as registered, group prefix included.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Capture names in the order they appear in the pattern.
    pub fn param_names(&self) -> &[Arc<str>] {
        &self.param_names
    }

    pub fn has_wildcard(&self) -> bool {
        self.has_wildcard
    }

    pub fn handler(&self) -> &Handler {
        &self.handler
    }

    /// Middleware chain, outermost first.
    pub fn middleware(&self) -> &[Middleware] {
        &self.middleware
    }

    /// The handler with its middleware chain applied.
    pub fn endpoint(&self) -> &Handler {
        &self.endpoint
    }

    /// Label used in errors and metrics.
    pub fn label(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("{} {}", self.method, self.pattern))
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("id", &self.id)
            .field("method", &self.method)
            .field("pattern", &self.pattern)
            .field("name", &self.name)
            .field("middleware", &self.middleware.len())
            .finish_non_exhaustive()
    }
}

/// Exported route record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRecord {
    pub method: String,
    pub path: String,
    pub name: Option<String>,
}

/// Ordered route storage with a name index.
#[derive(Debug, Default)]
pub struct RouteRegistry {
    routes: Vec<Route>,
    names: HashMap<String, RouteId>,
}

impl RouteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id the next registered route will receive.
    pub fn next_id(&self) -> RouteId {
        RouteId(self.routes.len())
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    /// Append a route, indexing its name if it has one.
    pub fn register(&mut self, mut route: Route) -> RouteResult<RouteId> {
        if let Some(name) = &route.name {
            if self.names.contains_key(name) {
                return Err(RouteError::DuplicateName(name.clone()));
            }
        }
        let id = self.next_id();
        route.id = id;
        if let Some(name) = &route.name {
            self.names.insert(name.clone(), id);
        }
        self.routes.push(route);
        Ok(id)
    }

    /// Name (or rename) an existing route.
    pub fn assign_name(&mut self, id: RouteId, name: impl Into<String>) -> RouteResult<()> {
        let name = name.into();
        match self.names.get(&name) {
            Some(holder) if *holder == id => return Ok(()),
            Some(_) => return Err(RouteError::DuplicateName(name)),
            None => {}
        }
        let route = self
            .routes
            .get_mut(id.0)
            .ok_or_else(|| RouteError::UnknownRoute(id.to_string()))?;
        if let Some(old) = route.name.replace(name.clone()) {
            self.names.remove(&old);
        }
        self.names.insert(name, id);
        Ok(())
    }

    pub fn get(&self, id: RouteId) -> Option<&Route> {
        self.routes.get(id.0)
    }

    /// All routes in registration order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Route> {
        self.names.get(name).and_then(|id| self.get(*id))
    }

    /// First route registered with this exact handler instance.
    pub fn find_by_handler(&self, handler: &Handler) -> Option<&Route> {
        self.routes.iter().find(|r| r.handler.ptr_eq(handler))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn records(&self) -> Vec<RouteRecord> {
        self.routes
            .iter()
            .map(|r| RouteRecord {
                method: r.method.to_string(),
                path: r.pattern.clone(),
                name: r.name.clone(),
            })
            .collect()
    }
}
