//! Channel path dispatcher.

use axum::extract::{Request, State};
use axum::response::{IntoResponse, Response};

use crate::extractors::{is_websocket_request, parse_channel_name};
use crate::state::AppState;

use super::{publish, ws};

/// ANY /{channel}. A WebSocket upgrade subscribes, anything else publishes.
pub async fn dispatch(State(state): State<AppState>, request: Request) -> Response {
    let name = match parse_channel_name(request.uri().path(), &state.config.relay.channel_names) {
        Ok(name) => name,
        Err(e) => return e.into_response(),
    };

    if is_websocket_request(request.method(), request.headers()) {
        ws::subscribe(state, name, request).await
    } else {
        publish::publish(&state, &name, request).await.into_response()
    }
}
