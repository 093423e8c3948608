//! Shared utilities for integration testing.

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{HeaderMap, Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

use sentry_tunnel::{Shutdown, TunnelConfig, TunnelServer};

/// What the mock upstream saw.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: String,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

pub type Captured = Arc<Mutex<Vec<CapturedRequest>>>;

#[derive(Clone)]
struct MockState {
    status: StatusCode,
    body: &'static str,
    delay: Duration,
    captured: Captured,
    completed: Arc<AtomicBool>,
}

/// Start a mock upstream that records every request and answers with a
/// fixed status and body.
pub async fn start_mock_upstream(status: u16, body: &'static str) -> (SocketAddr, Captured) {
    let (addr, captured, _) = start_upstream(status, body, Duration::ZERO).await;
    (addr, captured)
}

/// Like [`start_mock_upstream`], but waits `delay` before answering. The
/// flag is set only once a handler outlives its delay, so it stays false
/// when the caller hangs up first.
#[allow(dead_code)]
pub async fn start_slow_upstream(delay: Duration) -> (SocketAddr, Captured, Arc<AtomicBool>) {
    start_upstream(200, "slow", delay).await
}

async fn start_upstream(
    status: u16,
    body: &'static str,
    delay: Duration,
) -> (SocketAddr, Captured, Arc<AtomicBool>) {
    let captured: Captured = Arc::new(Mutex::new(Vec::new()));
    let completed = Arc::new(AtomicBool::new(false));
    let state = MockState {
        status: StatusCode::from_u16(status).unwrap(),
        body,
        delay,
        captured: captured.clone(),
        completed: completed.clone(),
    };
    let app = Router::new().fallback(capture).with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (addr, captured, completed)
}

async fn capture(State(state): State<MockState>, request: Request<Body>) -> Response {
    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    state.captured.lock().unwrap().push(CapturedRequest {
        method: parts.method.to_string(),
        path: parts.uri.path().to_string(),
        headers: parts.headers,
        body,
    });
    tokio::time::sleep(state.delay).await;
    state.completed.store(true, Ordering::SeqCst);
    (state.status, state.body).into_response()
}

/// An address nothing listens on.
#[allow(dead_code)]
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Default test configuration pointing at `upstream`.
pub fn tunnel_config(upstream: SocketAddr) -> TunnelConfig {
    let mut config = TunnelConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.upstream.url = format!("http://{upstream}");
    config
}

/// Start the tunnel on an ephemeral port.
pub async fn start_tunnel(config: TunnelConfig) -> (SocketAddr, Shutdown) {
    let server = TunnelServer::new(config).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
