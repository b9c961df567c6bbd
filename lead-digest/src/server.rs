//! HTTP server

use std::net::SocketAddr;

use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Bind the configured address and serve until Ctrl-C
///
/// # Errors
///
/// Returns an error if the address is invalid or cannot be bound.
pub async fn serve(state: AppState) -> anyhow::Result<()> {
    let service = &state.config().service;
    let addr: SocketAddr = format!("{}:{}", service.host, service.port).parse()?;

    let app = handlers::router(state).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl-C
pub async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
