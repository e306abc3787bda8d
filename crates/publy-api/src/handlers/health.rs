//! Health check handlers.

use axum::Json;
use axum::extract::State;

use publy_realtime::EngineStats;

use crate::dto::response::HealthResponse;
use crate::state::AppState;

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(state.relay.channels.stats().into())
}

/// GET /stats
pub async fn stats(State(state): State<AppState>) -> Json<EngineStats> {
    Json(state.relay.stats())
}
