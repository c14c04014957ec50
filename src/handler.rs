//! Handler and middleware abstractions.
//!
//! # Responsibilities
//! - `Handler`: accepts a request context and produces success or a typed failure
//! - `Middleware`: turns one handler into another
//! - Compose middleware chains, outermost first
//!
//! # Design Decisions
//! - Both are cheap-to-clone `Arc` wrappers around closures
//! - Handler identity is pointer identity, used for reverse lookups
//! - Handlers are synchronous; they write the response into the context

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use axum::http::StatusCode;
use thiserror::Error;

use crate::context::Context;

/// Failure produced by a handler.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Maps directly onto an HTTP status.
    #[error("{status}: {message}")]
    Status { status: StatusCode, message: String },

    /// Anything else; reported as 500.
    #[error(transparent)]
    Internal(#[from] Box<dyn StdError + Send + Sync>),
}

impl HandlerError {
    pub fn status(status: StatusCode, message: impl Into<String>) -> Self {
        HandlerError::Status {
            status,
            message: message.into(),
        }
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        HandlerError::Internal(Box::new(err))
    }

    /// Status code the dispatch layer should answer with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            HandlerError::Status { status, .. } => *status,
            HandlerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Result type for handlers.
pub type HandlerResult = Result<(), HandlerError>;

type HandlerFn = dyn Fn(&mut Context) -> HandlerResult + Send + Sync;
type MiddlewareFn = dyn Fn(Handler) -> Handler + Send + Sync;

/// A unit of work invoked for a matched route.
#[derive(Clone)]
pub struct Handler(Arc<HandlerFn>);

impl Handler {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut Context) -> HandlerResult + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, ctx: &mut Context) -> HandlerResult {
        (self.0)(ctx)
    }

    /// True when both values wrap the same handler instance.
    pub fn ptr_eq(&self, other: &Handler) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handler({:p})", Arc::as_ptr(&self.0))
    }
}

/// A handler transformer.
#[derive(Clone)]
pub struct Middleware(Arc<MiddlewareFn>);

impl Middleware {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Handler) -> Handler + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Middleware that runs `before` ahead of the wrapped handler.
    pub fn before<F>(before: F) -> Self
    where
        F: Fn(&mut Context) -> HandlerResult + Send + Sync + 'static,
    {
        let before = Arc::new(before);
        Self::new(move |next| {
            let before = before.clone();
            Handler::new(move |ctx| {
                before(ctx)?;
                next.call(ctx)
            })
        })
    }

    pub fn apply(&self, next: Handler) -> Handler {
        (self.0)(next)
    }

    pub fn ptr_eq(&self, other: &Middleware) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Middleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Middleware({:p})", Arc::as_ptr(&self.0))
    }
}

/// Wrap `handler` so that `chain[0]` runs outermost.
pub fn compose(handler: &Handler, chain: &[Middleware]) -> Handler {
    chain
        .iter()
        .rev()
        .fold(handler.clone(), |next, middleware| middleware.apply(next))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagging(tag: &'static str) -> Middleware {
        Middleware::before(move |ctx| {
            ctx.write_str(tag);
            Ok(())
        })
    }

    #[test]
    fn test_compose_runs_outermost_first() {
        let handler = Handler::new(|ctx| {
            ctx.write_str("handler");
            Ok(())
        });
        let endpoint = compose(&handler, &[tagging("A,"), tagging("B,")]);

        let mut ctx = Context::new();
        endpoint.call(&mut ctx).unwrap();
        assert_eq!(ctx.body(), b"A,B,handler");
    }

    #[test]
    fn test_middleware_can_short_circuit() {
        let deny = Middleware::before(|_| Err(HandlerError::status(StatusCode::FORBIDDEN, "denied")));
        let endpoint = compose(&Handler::new(|ctx| {
            ctx.write_str("unreachable");
            Ok(())
        }), &[deny]);

        let mut ctx = Context::new();
        let err = endpoint.call(&mut ctx).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        assert!(ctx.body().is_empty());
    }

    #[test]
    fn test_handler_identity() {
        let a = Handler::new(|_| Ok(()));
        let b = Handler::new(|_| Ok(()));
        assert!(a.ptr_eq(&a.clone()));
        assert!(!a.ptr_eq(&b));
    }
}
