//! Radix tree nodes.
//!
//! # Responsibilities
//! - Own every path segment node in a flat arena addressed by `NodeId`
//! - Insert decomposed patterns, splitting nodes on partial prefix overlap
//! - Hold per-method bindings to registered routes
//!
//! # Design Decisions
//! - Children are `NodeId` slots, never references; a split is a local
//!   rewrite of one node plus one new node
//! - Static prefixes are raw bytes so splits never care about char boundaries
//! - At most one parameter child and one wildcard child per node; capture
//!   names live on the route, not the node, so `:id` and `:uid` share a node
//! - Nodes are never removed

use std::mem;

use axum::http::Method;

use crate::routing::pattern::Segment;
use crate::routing::registry::RouteId;

/// Index of a node inside a [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/// What a node matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Literal bytes in `prefix`.
    Static,
    /// One non-empty segment.
    Param,
    /// The remainder of the path.
    Wildcard,
}

/// A single radix tree node.
#[derive(Debug)]
pub struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) prefix: Vec<u8>,
    /// Static children; first bytes are pairwise distinct.
    pub(crate) statics: Vec<NodeId>,
    pub(crate) param: Option<NodeId>,
    pub(crate) wildcard: Option<NodeId>,
    pub(crate) bindings: Vec<(Method, RouteId)>,
}

impl Node {
    fn new(kind: NodeKind, prefix: &[u8]) -> Self {
        Self {
            kind,
            prefix: prefix.to_vec(),
            statics: Vec::new(),
            param: None,
            wildcard: None,
            bindings: Vec::new(),
        }
    }

    /// Route bound for `method` at this node.
    pub fn binding(&self, method: &Method) -> Option<RouteId> {
        self.bindings
            .iter()
            .find(|(m, _)| m == method)
            .map(|(_, id)| *id)
    }

    /// Methods with a binding at this node.
    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.bindings.iter().map(|(m, _)| m)
    }

    pub fn has_bindings(&self) -> bool {
        !self.bindings.is_empty()
    }
}

/// Arena-backed radix tree shared by all methods.
#[derive(Debug)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// The root is an empty static node.
    pub const ROOT: NodeId = NodeId(0);

    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeKind::Static, b"")],
        }
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1 && !self.nodes[0].has_bindings()
    }

    /// Static child of `id` whose prefix starts with `label`.
    pub fn static_child(&self, id: NodeId, label: u8) -> Option<NodeId> {
        self.nodes[id.0]
            .statics
            .iter()
            .copied()
            .find(|child| self.nodes[child.0].prefix.first() == Some(&label))
    }

    /// Insert a decomposed pattern, returning the node that terminates it.
    pub fn insert(&mut self, segments: &[Segment<'_>]) -> NodeId {
        let mut current = Self::ROOT;
        for segment in segments {
            current = match segment {
                Segment::Static(text) => self.insert_static(current, text.as_bytes()),
                Segment::Param(_) => self.param_child(current),
                Segment::Wildcard(_) => return self.wildcard_child(current),
            };
        }
        current
    }

    /// Bind `route` for `method` at `id`. Returns the occupant on conflict.
    pub fn bind(&mut self, id: NodeId, method: Method, route: RouteId) -> Result<(), RouteId> {
        let node = &mut self.nodes[id.0];
        if let Some(existing) = node.binding(&method) {
            return Err(existing);
        }
        node.bindings.push((method, route));
        Ok(())
    }

    fn insert_static(&mut self, from: NodeId, text: &[u8]) -> NodeId {
        let mut current = from;
        let mut rest = text;

        while let Some(&label) = rest.first() {
            let Some(child) = self.static_child(current, label) else {
                let id = self.push(Node::new(NodeKind::Static, rest));
                self.nodes[current.0].statics.push(id);
                return id;
            };

            let common = common_prefix_len(&self.nodes[child.0].prefix, rest);
            if common < self.nodes[child.0].prefix.len() {
                self.split(child, common);
            }
            rest = &rest[common..];
            current = child;
        }
        current
    }

    /// Shorten `id` to `at` bytes, moving its tail, children and bindings
    /// onto a new static child.
    fn split(&mut self, id: NodeId, at: usize) {
        let node = &mut self.nodes[id.0];
        let tail = Node {
            kind: NodeKind::Static,
            prefix: node.prefix.split_off(at),
            statics: mem::take(&mut node.statics),
            param: node.param.take(),
            wildcard: node.wildcard.take(),
            bindings: mem::take(&mut node.bindings),
        };
        let tail_id = self.push(tail);
        self.nodes[id.0].statics.push(tail_id);
    }

    fn param_child(&mut self, id: NodeId) -> NodeId {
        if let Some(child) = self.nodes[id.0].param {
            return child;
        }
        let child = self.push(Node::new(NodeKind::Param, b":"));
        self.nodes[id.0].param = Some(child);
        child
    }

    fn wildcard_child(&mut self, id: NodeId) -> NodeId {
        if let Some(child) = self.nodes[id.0].wildcard {
            return child;
        }
        let child = self.push(Node::new(NodeKind::Wildcard, b"*"));
        self.nodes[id.0].wildcard = Some(child);
        child
    }

    fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefix(tree: &Tree, id: NodeId) -> &str {
        std::str::from_utf8(&tree.node(id).prefix).unwrap()
    }

    #[test]
    fn test_insert_creates_single_static_node() {
        let mut tree = Tree::new();
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 1);

        let leaf = tree.insert(&[Segment::Static("/users")]);
        assert_eq!(prefix(&tree, leaf), "/users");
        assert_eq!(tree.node(Tree::ROOT).statics, vec![leaf]);
        assert_eq!(tree.len(), 2);
        assert!(!tree.is_empty());
    }

    #[test]
    fn test_split_moves_bindings_to_tail() {
        let mut tree = Tree::new();
        let users = tree.insert(&[Segment::Static("/users")]);
        tree.bind(users, Method::GET, RouteId(0)).unwrap();

        let root_path = tree.insert(&[Segment::Static("/")]);

        // The original node keeps its id but is shortened to "/".
        assert_eq!(root_path, users);
        assert_eq!(prefix(&tree, users), "/");
        assert!(!tree.node(users).has_bindings());

        let tail = tree.static_child(users, b'u').unwrap();
        assert_eq!(tree.len(), 3);
        assert_eq!(prefix(&tree, tail), "users");
        assert_eq!(tree.node(tail).binding(&Method::GET), Some(RouteId(0)));
    }

    #[test]
    fn test_partial_overlap_splits_into_siblings() {
        let mut tree = Tree::new();
        let search = tree.insert(&[Segment::Static("/search")]);
        let support = tree.insert(&[Segment::Static("/support")]);

        assert_eq!(prefix(&tree, search), "/s");
        assert_eq!(prefix(&tree, support), "upport");
        let earch = tree.static_child(search, b'e').unwrap();
        assert_eq!(prefix(&tree, earch), "earch");
        assert_eq!(tree.node(search).statics.len(), 2);
    }

    #[test]
    fn test_param_and_wildcard_children_are_shared() {
        let mut tree = Tree::new();
        let a = tree.insert(&[Segment::Static("/users/"), Segment::Param("id")]);
        let b = tree.insert(&[Segment::Static("/users/"), Segment::Param("uid")]);
        assert_eq!(a, b);
        assert_eq!(tree.node(a).kind, NodeKind::Param);

        let w1 = tree.insert(&[Segment::Static("/files/"), Segment::Wildcard("*")]);
        let w2 = tree.insert(&[Segment::Static("/files/"), Segment::Wildcard("path")]);
        assert_eq!(w1, w2);
        assert_eq!(tree.node(w1).kind, NodeKind::Wildcard);
    }

    #[test]
    fn test_bind_reports_occupant() {
        let mut tree = Tree::new();
        let leaf = tree.insert(&[Segment::Static("/a")]);
        tree.bind(leaf, Method::GET, RouteId(3)).unwrap();
        tree.bind(leaf, Method::POST, RouteId(4)).unwrap();
        assert_eq!(tree.bind(leaf, Method::GET, RouteId(5)), Err(RouteId(3)));
        let methods: Vec<_> = tree.node(leaf).methods().cloned().collect();
        assert_eq!(methods, vec![Method::GET, Method::POST]);
    }
}
