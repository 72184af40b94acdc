//! Router construction and the server entry point.

use std::sync::Arc;

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{
    handler::{
        get_current_poll, get_participants, get_poll_history, get_session, health_check,
        websocket_handler,
    },
    signal::shutdown_signal,
    state::AppState,
};
use crate::{config::ServerConfig, error::ServerError};

/// Build the Axum router with all routes
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ws", get(websocket_handler))
        .route("/api/health", get(health_check))
        .route("/api/session", get(get_session))
        .route("/api/polls/current", get(get_current_poll))
        .route("/api/polls/history", get(get_poll_history))
        .route("/api/participants", get(get_participants))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        // the browser client is served from another origin
        .layer(CorsLayer::permissive())
}

/// Bind to the configured address and serve until Ctrl-C / SIGTERM
pub async fn run(config: &ServerConfig) -> Result<(), ServerError> {
    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;

    serve(listener, Arc::new(AppState::in_memory())).await
}

/// Serve `state` on an already bound listener
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> Result<(), ServerError> {
    let local_addr = listener.local_addr()?;
    tracing::info!("Listening on http://{}", local_addr);
    tracing::info!("WebSocket endpoint: ws://{}/ws", local_addr);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
