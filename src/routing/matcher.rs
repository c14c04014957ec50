//! Route lookup.
//!
//! # Responsibilities
//! - Walk the radix tree against a request path
//! - Resolve ambiguity as static > parameter > wildcard at every node
//! - Backtrack out of branches that cannot reach a binding for the method
//! - Tell "no such path" apart from "path exists, method does not"
//!
//! # Design Decisions
//! - Depth-first with per-node precedence, so a failing static branch falls
//!   back to the parameter and then the wildcard sibling
//! - Captures are byte spans while walking and are copied out only on success
//! - Read-only over the tree; all writes go to the caller's `Params`

use axum::http::Method;

use crate::context::Params;
use crate::handler::{Handler, Middleware};
use crate::routing::node::{Node, NodeId, Tree};
use crate::routing::registry::{Route, RouteId};

/// Outcome of a lookup.
#[derive(Debug)]
pub enum Lookup<'r> {
    Found(MatchResult<'r>),
    /// The path matches at least one route, none of them for this method.
    MethodNotAllowed { allowed: Vec<Method> },
    NotFound,
}

impl<'r> Lookup<'r> {
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    pub fn found(self) -> Option<MatchResult<'r>> {
        match self {
            Lookup::Found(m) => Some(m),
            _ => None,
        }
    }

    /// Label for logs and metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            Lookup::Found(_) => "found",
            Lookup::MethodNotAllowed { .. } => "method_not_allowed",
            Lookup::NotFound => "not_found",
        }
    }
}

/// A successful lookup. Captured values are in the `Params` passed to `find`.
#[derive(Debug, Clone, Copy)]
pub struct MatchResult<'r> {
    route: &'r Route,
}

impl<'r> MatchResult<'r> {
    pub(crate) fn new(route: &'r Route) -> Self {
        Self { route }
    }

    pub fn route(&self) -> &'r Route {
        self.route
    }

    pub fn id(&self) -> RouteId {
        self.route.id()
    }

    pub fn name(&self) -> Option<&'r str> {
        self.route.name()
    }

    pub fn handler(&self) -> &'r Handler {
        self.route.handler()
    }

    pub fn middleware(&self) -> &'r [Middleware] {
        self.route.middleware()
    }

    /// Handler wrapped by its middleware chain.
    pub fn endpoint(&self) -> &'r Handler {
        self.route.endpoint()
    }
}

/// Find the route bound for `method` at `path`.
///
/// On failure returns the methods bound at nodes the full path reached,
/// which is empty when the path itself is unknown.
pub(crate) fn walk(
    tree: &Tree,
    method: &Method,
    path: &str,
    params: &mut Params,
) -> Result<RouteId, Vec<Method>> {
    let mut walk = Walk {
        tree,
        method,
        path: path.as_bytes(),
        params,
        allowed: Vec::new(),
    };
    walk.visit(Tree::ROOT, 0).ok_or(walk.allowed)
}

struct Walk<'a> {
    tree: &'a Tree,
    method: &'a Method,
    path: &'a [u8],
    params: &'a mut Params,
    allowed: Vec<Method>,
}

impl Walk<'_> {
    /// `id`'s own prefix is already consumed; `pos` is the next unread byte.
    fn visit(&mut self, id: NodeId, pos: usize) -> Option<RouteId> {
        let tree = self.tree;
        let path = self.path;
        let node = tree.node(id);
        let rest = &path[pos..];

        match rest.first() {
            None => {
                if let Some(route) = self.terminal(node) {
                    return Some(route);
                }
            }
            Some(&label) => {
                if let Some(child) = tree.static_child(id, label) {
                    let prefix = &tree.node(child).prefix;
                    if rest.starts_with(prefix) {
                        if let Some(route) = self.visit(child, pos + prefix.len()) {
                            return Some(route);
                        }
                    }
                }

                if let Some(child) = node.param {
                    let end = rest.iter().position(|b| *b == b'/').unwrap_or(rest.len());
                    if end > 0 {
                        self.params.push_span(pos..pos + end);
                        if let Some(route) = self.visit(child, pos + end) {
                            return Some(route);
                        }
                        self.params.pop_span();
                    }
                }
            }
        }

        if let Some(child) = node.wildcard {
            self.params.push_span(pos..path.len());
            if let Some(route) = self.terminal(tree.node(child)) {
                return Some(route);
            }
            self.params.pop_span();
        }
        None
    }

    fn terminal(&mut self, node: &Node) -> Option<RouteId> {
        if let Some(route) = node.binding(self.method) {
            return Some(route);
        }
        for method in node.methods() {
            if !self.allowed.contains(method) {
                self.allowed.push(method.clone());
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::pattern::{parse, Segment};

    fn tree_with(routes: &[(&str, Method)]) -> Tree {
        let mut tree = Tree::new();
        for (i, (pattern, method)) in routes.iter().enumerate() {
            let parsed = parse(pattern).unwrap();
            let node = tree.insert(&parsed.segments);
            tree.bind(node, method.clone(), RouteId(i)).unwrap();
        }
        tree
    }

    fn lookup(tree: &Tree, method: Method, path: &str) -> Result<RouteId, Vec<Method>> {
        let mut params = Params::new();
        walk(tree, &method, path, &mut params)
    }

    #[test]
    fn test_static_beats_param() {
        let tree = tree_with(&[("/users/:id", Method::GET), ("/users/new", Method::GET)]);
        assert_eq!(lookup(&tree, Method::GET, "/users/new"), Ok(RouteId(1)));
        assert_eq!(lookup(&tree, Method::GET, "/users/nex"), Ok(RouteId(0)));
    }

    #[test]
    fn test_backtracks_from_dead_static_branch() {
        // "/users/new/edit" only exists as a parameter route.
        let tree = tree_with(&[
            ("/users/new", Method::GET),
            ("/users/:id/edit", Method::GET),
        ]);
        assert_eq!(lookup(&tree, Method::GET, "/users/new/edit"), Ok(RouteId(1)));
    }

    #[test]
    fn test_backtracks_when_static_lacks_method() {
        let tree = tree_with(&[("/users/new", Method::POST), ("/users/:id", Method::GET)]);
        assert_eq!(lookup(&tree, Method::GET, "/users/new"), Ok(RouteId(1)));
        assert_eq!(lookup(&tree, Method::POST, "/users/new"), Ok(RouteId(0)));
    }

    #[test]
    fn test_wildcard_is_last_resort() {
        let tree = tree_with(&[
            ("/static/*", Method::GET),
            ("/static/:file", Method::GET),
            ("/static/app.js", Method::GET),
        ]);
        assert_eq!(lookup(&tree, Method::GET, "/static/app.js"), Ok(RouteId(2)));
        assert_eq!(lookup(&tree, Method::GET, "/static/x.css"), Ok(RouteId(1)));
        assert_eq!(lookup(&tree, Method::GET, "/static/css/x.css"), Ok(RouteId(0)));
        assert_eq!(lookup(&tree, Method::GET, "/static/"), Ok(RouteId(0)));
    }

    #[test]
    fn test_captures_are_unwound_on_backtrack() {
        let tree = tree_with(&[("/a/:x/b", Method::GET), ("/a/*", Method::GET)]);
        let mut params = Params::new();
        let found = walk(&tree, &Method::GET, "/a/1/c", &mut params).unwrap();
        assert_eq!(found, RouteId(1));
        params.commit("/a/1/c", &parse("/a/*").unwrap().param_names());
        assert_eq!(params.get("*"), Some("1/c"));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_method_not_allowed_collects_methods() {
        let tree = tree_with(&[
            ("/items", Method::GET),
            ("/items", Method::POST),
            ("/items/:id", Method::DELETE),
        ]);
        assert_eq!(
            lookup(&tree, Method::PUT, "/items"),
            Err(vec![Method::GET, Method::POST])
        );
        assert_eq!(lookup(&tree, Method::GET, "/items/3"), Err(vec![Method::DELETE]));
        assert_eq!(lookup(&tree, Method::GET, "/nothing"), Err(vec![]));
    }

    #[test]
    fn test_empty_param_never_matches() {
        let tree = tree_with(&[("/users/:id", Method::GET)]);
        assert_eq!(lookup(&tree, Method::GET, "/users/"), Err(vec![]));
        assert_eq!(lookup(&tree, Method::GET, "/users"), Err(vec![]));
    }

    #[test]
    fn test_insert_segments_directly() {
        let mut tree = Tree::new();
        let node = tree.insert(&[Segment::Static("/")]);
        tree.bind(node, Method::GET, RouteId(0)).unwrap();
        assert_eq!(lookup(&tree, Method::GET, "/"), Ok(RouteId(0)));
        assert_eq!(lookup(&tree, Method::GET, ""), Err(vec![]));
    }
}
