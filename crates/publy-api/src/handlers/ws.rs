//! WebSocket subscribe sessions.

use std::future;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{FromRequestParts, Request, WebSocketUpgrade};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tokio::sync::{broadcast, oneshot};
use tokio::time::{self, Instant, Interval};
use tracing::{debug, info, warn};

use publy_realtime::{Sink, SinkReceiver};
use publy_realtime::metrics::connections;

use crate::state::AppState;

/// How long a closing session waits for its Close frame to be written.
const CLOSE_GRACE: Duration = Duration::from_secs(1);

/// Why a subscriber session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionEnd {
    /// Client sent Close, hung up, or the read side errored.
    RemoteClosed,
    /// Writing a frame to the client failed.
    WriteFailed,
    /// The configured session lifetime elapsed.
    TimedOut,
    /// The relay is shutting down.
    Shutdown,
}

/// GET /{channel} with upgrade headers: subscribe to `name`.
pub async fn subscribe(state: AppState, name: String, request: Request) -> Response {
    let (mut parts, _body) = request.into_parts();

    let ws = match WebSocketUpgrade::from_request_parts(&mut parts, &state).await {
        Ok(ws) => ws,
        Err(rejection) => return rejection.into_response(),
    };

    debug!(channel = %name, "Upgrading subscriber connection");
    ws.on_upgrade(move |socket| run_session(state, name, socket))
}

/// Joins the channel, pumps payloads to the socket, and leaves exactly once.
async fn run_session(state: AppState, name: String, socket: WebSocket) {
    let relay = state.relay.clone();
    let config = relay.config().clone();
    let shutdown = relay.shutdown_receiver();

    let (sink, inbox) = Sink::bounded(config.sink_capacity);
    let channel = match relay.channels.subscribe(&name, sink.clone()).await {
        Ok(channel) => channel,
        Err(e) => {
            warn!(channel = %name, error = %e, "Subscribe failed");
            return;
        }
    };

    connections::record_connect(&relay.metrics);
    info!(channel = %name, sink = %sink.id(), "Subscriber session started");

    // `pump` returns only after the inbox is dropped, which releases any
    // block-mode publisher waiting on it before `leave` needs the lock.
    let end = pump(
        socket,
        inbox,
        config.ping_interval(),
        config.session_timeout(),
        shutdown,
    )
    .await;

    channel.leave(&sink).await;
    connections::record_disconnect(&relay.metrics);

    info!(channel = %name, sink = %sink.id(), reason = ?end, "Subscriber session closed");
}

/// Runs the session until the client leaves, a write fails, the deadline
/// passes or the relay shuts down.
///
/// Writes happen on a spawned forwarder that owns the inbox, so a client
/// that stops reading cannot hold the session past its deadline. Inbound
/// frames are read only to notice Close and errors; their content is
/// discarded.
async fn pump(
    socket: WebSocket,
    inbox: SinkReceiver,
    ping_interval: Option<Duration>,
    session_timeout: Option<Duration>,
    mut shutdown: broadcast::Receiver<()>,
) -> SessionEnd {
    let (ws_tx, mut ws_rx) = socket.split();
    let (close_tx, close_rx) = oneshot::channel();
    let mut forwarder = tokio::spawn(forward(ws_tx, inbox, ping_interval, close_rx));

    let deadline = expire(session_timeout);
    tokio::pin!(deadline);

    let end = loop {
        tokio::select! {
            _ = &mut forwarder => return SessionEnd::WriteFailed,
            frame = ws_rx.next() => match frame {
                Some(Ok(Message::Close(_))) | None => break SessionEnd::RemoteClosed,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!(error = %e, "WebSocket read failed");
                    break SessionEnd::RemoteClosed;
                }
            },
            _ = &mut deadline => break SessionEnd::TimedOut,
            _ = shutdown.recv() => break SessionEnd::Shutdown,
        }
    };

    if end != SessionEnd::RemoteClosed {
        let _ = close_tx.send(());
        if time::timeout(CLOSE_GRACE, &mut forwarder).await.is_ok() {
            return end;
        }
        debug!(reason = ?end, "Subscriber not draining, aborting writer");
    }

    forwarder.abort();
    let _ = forwarder.await;
    end
}

/// Writes sink payloads and keepalive pings until a write fails or the
/// session asks it to close.
async fn forward(
    mut ws_tx: SplitSink<WebSocket, Message>,
    mut inbox: SinkReceiver,
    ping_interval: Option<Duration>,
    mut close: oneshot::Receiver<()>,
) {
    let mut pings = ping_interval.map(|period| time::interval_at(Instant::now() + period, period));

    loop {
        tokio::select! {
            payload = inbox.recv() => {
                // Unreachable while the session holds its `Sink`.
                let Some(payload) = payload else {
                    return;
                };
                debug!(bytes = payload.len(), "Forwarding message to subscriber");
                if let Err(e) = ws_tx.send(Message::Text(payload.to_string().into())).await {
                    debug!(error = %e, "WebSocket write failed");
                    return;
                }
            }
            _ = tick(&mut pings) => {
                if ws_tx.send(Message::Ping(Bytes::new())).await.is_err() {
                    return;
                }
            }
            _ = &mut close => {
                let _ = ws_tx.send(Message::Close(None)).await;
                return;
            }
        }
    }
}

async fn expire(limit: Option<Duration>) {
    match limit {
        Some(limit) => time::sleep(limit).await,
        None => future::pending().await,
    }
}

async fn tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => future::pending().await,
    }
}
