//! Application builder: wires router, middleware and state into an Axum app.

use std::future::Future;

use axum::Router;
use axum::middleware as axum_middleware;
use tokio::net::TcpListener;

use publy_core::config::AppConfig;
use publy_core::error::AppError;

use crate::middleware::cors::build_cors_layer;
use crate::middleware::logging::request_logging;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server.cors);

    build_router(state)
        .layer(cors)
        .layer(axum_middleware::from_fn(request_logging))
}

/// Serves `state` on an already-bound listener until `signal` resolves.
///
/// When the signal fires the relay engine is shut down first, so every
/// subscriber session leaves its channel and closes, then in-flight
/// requests drain.
pub async fn serve<F>(listener: TcpListener, state: AppState, signal: F) -> Result<(), AppError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let relay = state.relay.clone();
    let app = build_app(state);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            signal.await;
            relay.shutdown();
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))
}

/// Binds the configured address and runs the relay until Ctrl-C.
pub async fn run_server(config: AppConfig) -> Result<(), AppError> {
    let addr = config.server.bind_address();
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!(
        address = %addr,
        delivery_mode = ?config.relay.delivery_mode,
        "Listening"
    );

    serve(listener, AppState::new(config), shutdown_signal()).await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
