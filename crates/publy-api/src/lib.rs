//! # publy-api
//!
//! HTTP layer for Publy built on Axum.
//!
//! Maps request paths to channel names, upgrades subscribe requests to
//! WebSocket sessions, fans publish requests out through the relay engine,
//! and serves the health and stats endpoints.

pub mod app;
pub mod dto;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server, serve};
pub use state::AppState;
