//! Route definitions for the Publy HTTP API.
//!
//! `/health` and `/stats` are fixed routes. Every other path names a
//! channel and falls through to the channel dispatcher.

use axum::{Router, routing::get};

use crate::handlers;
use crate::state::AppState;

/// Build the router and thread `state` through every route.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .fallback(handlers::channel::dispatch)
        .with_state(state)
}

/// Health and stats endpoints
fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/health/", get(handlers::health::health))
        .route("/stats", get(handlers::health::stats))
}
