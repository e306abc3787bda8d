//! Integration tests for WebSocket subscribe sessions against a live server.

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use http::StatusCode;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use publy_core::config::DeliveryMode;
use publy_realtime::Payload;

use helpers::{CHANNEL, TestServer, test_config};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn connect(server: &TestServer, name: &str) -> Client {
    let (ws, _) = connect_async(server.ws_url(name))
        .await
        .expect("WebSocket handshake failed");
    ws
}

/// Next frame that is not a keepalive, or `None` once the stream ends.
async fn next_frame(ws: &mut Client) -> Option<Message> {
    let read = async {
        loop {
            match ws.next().await {
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => continue,
                Some(Ok(message)) => return Some(message),
                Some(Err(_)) | None => return None,
            }
        }
    };
    tokio::time::timeout(Duration::from_secs(5), read)
        .await
        .expect("Timed out waiting for a frame")
}

async fn next_text(ws: &mut Client) -> String {
    match next_frame(ws).await {
        Some(Message::Text(text)) => text.as_str().to_string(),
        other => panic!("Expected a text frame, got {other:?}"),
    }
}

#[tokio::test]
async fn test_subscribe_publish_unsubscribe() {
    let server = TestServer::spawn().await;
    let path = format!("/{CHANNEL}");

    let mut ws = connect(&server, CHANNEL).await;
    server.wait_for_listeners(CHANNEL, 1).await;

    let response = server.request("GET", "/health", None).await;
    assert_eq!(
        response.body,
        serde_json::json!({ "channels": 1, "listeners": 1 })
    );

    let response = server.request("POST", &path, Some("hello")).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(next_text(&mut ws).await, "hello");

    let response = server.request("GET", &format!("{path}?world"), None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(next_text(&mut ws).await, "world");

    ws.close(None).await.expect("Close failed");
    server.wait_for_listeners(CHANNEL, 0).await;

    let response = server.request("POST", &path, Some("late")).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = server.request("GET", "/health", None).await;
    assert_eq!(
        response.body,
        serde_json::json!({ "channels": 0, "listeners": 0 })
    );

    server.shutdown().await;
}

#[tokio::test]
async fn test_every_subscriber_receives_in_order() {
    let server = TestServer::spawn().await;
    let path = format!("/{CHANNEL}");

    let mut first = connect(&server, CHANNEL).await;
    let mut second = connect(&server, &format!("{CHANNEL}/")).await;
    server.wait_for_listeners(CHANNEL, 2).await;

    for body in ["m1", "m2", "m3"] {
        let response = server.request("POST", &path, Some(body)).await;
        assert_eq!(response.status, StatusCode::OK);
    }

    for ws in [&mut first, &mut second] {
        for expected in ["m1", "m2", "m3"] {
            assert_eq!(next_text(ws).await, expected);
        }
    }

    first.close(None).await.expect("Close failed");
    server.wait_for_listeners(CHANNEL, 1).await;

    server.request("POST", &path, Some("m4")).await;
    assert_eq!(next_text(&mut second).await, "m4");

    server.shutdown().await;
}

#[tokio::test]
async fn test_channels_are_isolated() {
    let server = TestServer::spawn().await;
    let other = "ponmlkjihgfedcba";

    let mut ws = connect(&server, CHANNEL).await;
    let mut other_ws = connect(&server, other).await;
    server.wait_for_listeners(CHANNEL, 1).await;
    server.wait_for_listeners(other, 1).await;

    server.request("POST", &format!("/{other}"), Some("for-other")).await;
    server.request("POST", &format!("/{CHANNEL}"), Some("for-main")).await;

    assert_eq!(next_text(&mut ws).await, "for-main");
    assert_eq!(next_text(&mut other_ws).await, "for-other");

    server.shutdown().await;
}

#[tokio::test]
async fn test_session_timeout_closes_and_leaves() {
    let mut config = test_config();
    config.relay.session_timeout_seconds = 1;
    let server = TestServer::spawn_with(config).await;

    let mut ws = connect(&server, CHANNEL).await;
    server.wait_for_listeners(CHANNEL, 1).await;

    match next_frame(&mut ws).await {
        Some(Message::Close(_)) | None => {}
        other => panic!("Expected the session to close, got {other:?}"),
    }
    server.wait_for_listeners(CHANNEL, 0).await;

    server.shutdown().await;
}

/// One MiB of text, enough to fill socket buffers within a few messages.
fn large_payload() -> Payload {
    Arc::from("x".repeat(1 << 20))
}

#[tokio::test]
async fn test_session_timeout_reaches_a_client_that_stops_reading() {
    let mut config = test_config();
    config.relay.session_timeout_seconds = 1;
    let server = TestServer::spawn_with(config).await;
    let channels = server.state.relay.channels.clone();

    // Handshake completes, then the client never reads again.
    let _stalled = connect(&server, CHANNEL).await;
    server.wait_for_listeners(CHANNEL, 1).await;

    let payload = large_payload();
    for _ in 0..64 {
        if channels.publish(CHANNEL, payload.clone()).await.is_err() {
            break;
        }
    }

    server.wait_for_listeners(CHANNEL, 0).await;
    assert!(channels.get(CHANNEL).is_none());

    server.shutdown().await;
}

#[tokio::test]
async fn test_block_mode_publisher_released_when_stalled_session_ends() {
    let mut config = test_config();
    config.relay.delivery_mode = DeliveryMode::Block;
    config.relay.session_timeout_seconds = 1;
    let server = TestServer::spawn_with(config).await;
    let channels = server.state.relay.channels.clone();

    let _stalled = connect(&server, CHANNEL).await;
    server.wait_for_listeners(CHANNEL, 1).await;

    let payload = large_payload();
    let published = tokio::time::timeout(Duration::from_secs(10), async {
        let mut published = 0;
        while channels.publish(CHANNEL, payload.clone()).await.is_ok() {
            published += 1;
        }
        published
    })
    .await
    .expect("Publisher stayed blocked on a stalled subscriber");

    assert!(published > 0);
    server.wait_for_listeners(CHANNEL, 0).await;

    let mut fresh = connect(&server, CHANNEL).await;
    server.wait_for_listeners(CHANNEL, 1).await;
    server
        .request("POST", &format!("/{CHANNEL}"), Some("after"))
        .await;
    assert_eq!(next_text(&mut fresh).await, "after");

    server.shutdown().await;
}

#[tokio::test]
async fn test_shutdown_closes_subscribers() {
    let server = TestServer::spawn().await;
    let channels = server.state.relay.channels.clone();

    let mut ws = connect(&server, CHANNEL).await;
    server.wait_for_listeners(CHANNEL, 1).await;

    server.shutdown().await;

    match next_frame(&mut ws).await {
        Some(Message::Close(_)) | None => {}
        other => panic!("Expected the session to close, got {other:?}"),
    }

    let gone = tokio::time::timeout(Duration::from_secs(5), async {
        while channels.get(CHANNEL).is_some() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(gone.is_ok(), "Channel outlived shutdown");
}
