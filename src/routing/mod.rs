//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (startup, single-threaded):
//!     Router::add / Group::add (method, pattern, handler, middleware)
//!     → pattern.rs (split into static / :param / * tokens)
//!     → node.rs (insert into radix tree, split nodes on partial overlap)
//!     → registry.rs (ordered route list + name index)
//!
//! Lookup (per request, concurrent):
//!     Router::find (method, path, &mut Params)
//!     → matcher.rs (walk tree: static > param > wildcard, backtracking)
//!     → Found(route) | MethodNotAllowed(allowed) | NotFound
//!
//! Reverse routing (out of band):
//!     Router::uri_for* → registry.rs → uri.rs (substitute positional values)
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex; matching is linear in path length and tree depth
//! - Deterministic precedence independent of registration order
//! - Explicit NotFound vs MethodNotAllowed rather than a silent default

pub mod error;
pub mod group;
pub mod matcher;
pub mod node;
pub mod pattern;
pub mod registry;
pub mod router;
pub mod uri;

pub use error::{RouteError, RouteResult};
pub use group::Group;
pub use matcher::{Lookup, MatchResult};
pub use registry::{Route, RouteId, RouteRecord, RouteRegistry};
pub use router::{Router, ANY_METHODS};
