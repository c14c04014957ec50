//! Shared utilities for integration tests.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::http::Method;
use radix_router::config::RouterConfig;
use radix_router::http::HttpServer;
use radix_router::lifecycle::Shutdown;
use radix_router::{ContextPool, Handler, Lookup, Middleware, Params, Router};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Handler that writes `tag` as the response body.
pub fn tagged(tag: &'static str) -> Handler {
    Handler::new(move |ctx| {
        ctx.write_str(tag);
        Ok(())
    })
}

/// Shared, ordered record of which middleware ran.
#[derive(Clone, Default)]
pub struct Trail(Arc<Mutex<Vec<&'static str>>>);

impl Trail {
    pub fn middleware(&self, tag: &'static str) -> Middleware {
        let trail = self.clone();
        Middleware::before(move |_| {
            trail.0.lock().unwrap().push(tag);
            Ok(())
        })
    }

    pub fn take(&self) -> Vec<&'static str> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}

/// Body produced by the route `method path` resolves to, or None.
pub fn body_for(router: &Router, method: Method, path: &str) -> Option<String> {
    let mut ctx = radix_router::Context::new();
    ctx.prepare(&method, path, None);
    let (m, p, params) = ctx.lookup_parts();
    let endpoint = router.find(m, p, params).found()?.endpoint().clone();
    endpoint.call(&mut ctx).ok()?;
    Some(String::from_utf8_lossy(ctx.body()).into_owned())
}

/// Captured params as owned pairs, or None when nothing matched.
pub fn params_for(router: &Router, method: Method, path: &str) -> Option<Vec<(String, String)>> {
    let mut params = Params::new();
    match router.find(&method, path, &mut params) {
        Lookup::Found(_) => Some(
            params
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        ),
        _ => None,
    }
}

/// A running server on an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<Result<(), std::io::Error>>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn stop(self) {
        self.shutdown.trigger();
        self.handle.await.unwrap().unwrap();
    }
}

/// Serve `router` on 127.0.0.1:0.
pub async fn start_server(router: Router) -> TestServer {
    start_server_with(router, RouterConfig::default()).await
}

pub async fn start_server_with(router: Router, config: RouterConfig) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    let server = HttpServer::new(Arc::new(router), Arc::new(ContextPool::new(16)), &config);
    let handle = tokio::spawn(server.run(listener, rx));

    TestServer {
        addr,
        shutdown,
        handle,
    }
}
