//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, catch-all fallback)
//!     → request.rs (request ID)
//!     → routing::Router::find with a pooled Context
//!     → matched endpoint (middleware chain + handler)
//!     → response.rs (Context / 404 / 405 / handler error → Response)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{request_id, MakeRequestUuid, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
