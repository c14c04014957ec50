//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML.

use std::str::FromStr;

use axum::http::Method;
use serde::{Deserialize, Serialize};

use crate::routing::ANY_METHODS;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RouterConfig {
    /// Listener configuration.
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Context pool sizing.
    pub pool: PoolConfig,

    /// Declarative routes served by the binary.
    pub routes: Vec<RouteConfig>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Largest request body buffered for handlers, in bytes.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_body_bytes: 2 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable the Prometheus endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Maximum idle contexts kept for reuse.
    pub max_idle: usize,

    /// Contexts allocated at startup.
    pub prewarm: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_idle: 1024,
            prewarm: 0,
        }
    }
}

/// A route answered with a fixed status and a body template.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// HTTP method, or "ANY".
    pub method: String,

    /// Route pattern (`/users/:id`, `/files/*`).
    pub path: String,

    /// Optional route name for reverse routing.
    #[serde(default)]
    pub name: Option<String>,

    /// Response status (default: 200).
    #[serde(default = "default_status")]
    pub status: u16,

    /// Response body; `{param}` placeholders are filled from captures.
    #[serde(default)]
    pub body: String,
}

fn default_status() -> u16 {
    200
}

impl RouteConfig {
    /// Methods this entry registers for.
    pub fn methods(&self) -> Result<Vec<Method>, String> {
        if self.method.eq_ignore_ascii_case("any") {
            return Ok(ANY_METHODS.to_vec());
        }
        Method::from_str(&self.method.to_ascii_uppercase())
            .map(|m| vec![m])
            .map_err(|_| self.method.clone())
    }
}
