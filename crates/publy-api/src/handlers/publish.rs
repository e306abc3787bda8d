//! Publish handler.

use axum::body;
use axum::extract::Request;
use axum::http::{Method, StatusCode};
use tracing::debug;

use publy_core::error::AppError;
use publy_core::result::AppResult;

use crate::state::AppState;

/// Broadcasts the request payload to `name`.
///
/// The payload is the raw query string for `GET`, the body otherwise.
/// Unknown channels answer 404; a successful fan-out answers 200 no
/// matter how many listeners dropped the message.
pub async fn publish(state: &AppState, name: &str, request: Request) -> AppResult<StatusCode> {
    let channel = state
        .relay
        .channels
        .get(name)
        .ok_or_else(|| AppError::not_found(format!("No channel: {name}")))?;

    let payload = read_payload(request, state.config.server.max_payload_bytes).await?;
    let report = channel.broadcast(payload).await;

    debug!(
        channel = %name,
        listeners = report.listeners,
        delivered = report.delivered,
        dropped = report.dropped,
        "Message dispatched"
    );

    Ok(StatusCode::OK)
}

async fn read_payload(request: Request, limit: usize) -> AppResult<String> {
    if request.method() == Method::GET {
        return Ok(request.uri().query().unwrap_or_default().to_string());
    }

    let bytes = body::to_bytes(request.into_body(), limit)
        .await
        .map_err(|e| AppError::validation(format!("Failed to read body: {e}")))?;

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
