//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower::ServiceExt;

use publy_api::{AppState, build_app};
use publy_core::config::AppConfig;

/// A channel name that satisfies the default length rule.
pub const CHANNEL: &str = "abcdefghijklmnop";

/// Configuration tuned for tests: no keepalive pings, small queues.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.relay.ping_interval_seconds = 0;
    config.relay.sink_capacity = 8;
    config
}

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared state, for reaching the relay directly
    pub state: AppState,
}

impl TestApp {
    /// Create a new test application with [`test_config`].
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    /// Create a test application from `config`.
    pub fn with_config(config: AppConfig) -> Self {
        let state = AppState::new(config);
        let router = build_app(state.clone());
        Self { router, state }
    }

    /// Make an HTTP request to the test app
    pub async fn request(&self, method: &str, path: &str, body: Option<&str>) -> TestResponse {
        send(&self.router, method, path, body).await
    }
}

/// A relay bound to an ephemeral local port.
pub struct TestServer {
    /// Bound address
    pub addr: SocketAddr,
    /// State shared with the running server
    pub state: AppState,
    router: Router,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Spawn a server with [`test_config`].
    pub async fn spawn() -> Self {
        Self::spawn_with(test_config()).await
    }

    /// Spawn a server from `config` on 127.0.0.1:0.
    pub async fn spawn_with(config: AppConfig) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("No local address");

        let state = AppState::new(config);
        let router = build_app(state.clone());
        let (tx, rx) = oneshot::channel::<()>();

        let server_state = state.clone();
        let handle = tokio::spawn(async move {
            publy_api::serve(listener, server_state, async move {
                let _ = rx.await;
            })
            .await
            .expect("Server failed");
        });

        Self {
            addr,
            state,
            router,
            shutdown: Some(tx),
            handle,
        }
    }

    /// WebSocket URL for a channel path.
    pub fn ws_url(&self, name: &str) -> String {
        format!("ws://{}/{}", self.addr, name)
    }

    /// Publish through the app sharing this server's relay.
    pub async fn request(&self, method: &str, path: &str, body: Option<&str>) -> TestResponse {
        send(&self.router, method, path, body).await
    }

    /// Polls until `name` has exactly `count` listeners (0 meaning absent).
    pub async fn wait_for_listeners(&self, name: &str, count: usize) {
        let channels = self.state.relay.channels.clone();
        let reached = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let current = channels.get(name).map_or(0, |c| c.listener_count());
                if current == count {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await;

        assert!(
            reached.is_ok(),
            "Channel {name} never reached {count} listeners"
        );
    }

    /// Trigger graceful shutdown and wait for the server task.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        tokio::time::timeout(Duration::from_secs(5), &mut self.handle)
            .await
            .expect("Server did not shut down")
            .expect("Server task panicked");
    }
}

async fn send(router: &Router, method: &str, path: &str, body: Option<&str>) -> TestResponse {
    let req = Request::builder()
        .method(method)
        .uri(path)
        .body(Body::from(body.unwrap_or_default().to_string()))
        .expect("Failed to build request");

    let response = router
        .clone()
        .oneshot(req)
        .await
        .expect("Failed to send request");

    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("Failed to read body");

    let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

    TestResponse { status, body }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}
