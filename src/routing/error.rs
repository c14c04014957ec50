//! Registration and reverse-routing errors.

use axum::http::Method;
use thiserror::Error;

/// Errors raised while registering routes or building URIs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// The method + normalized pattern slot is already bound to another handler.
    #[error("{method} {pattern} conflicts with an existing route")]
    Conflict { method: Method, pattern: String },

    /// A route with this name already exists.
    #[error("route name '{0}' is already in use")]
    DuplicateName(String),

    /// Fewer positional values than the pattern has parameters.
    #[error("route '{route}' expects {expected} parameter value(s), got {supplied}")]
    ParameterCount {
        route: String,
        expected: usize,
        supplied: usize,
    },

    /// The pattern cannot be decomposed into segments.
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: &'static str },

    /// No route matches the given id, name or handler.
    #[error("unknown route: {0}")]
    UnknownRoute(String),
}

/// Result type for routing operations.
pub type RouteResult<T> = Result<T, RouteError>;
