//! HTTP surface for the FarmDash backend.

pub mod body;
pub mod handlers;
pub mod reply;
pub mod routes;
pub mod state;

pub use body::{json_body, parse_body, ApiRejection, MAX_BODY_BYTES};
pub use reply::{error_reply, handle_rejection};
pub use routes::routes;
pub use state::AppState;

use anyhow::{Context, Result};
use farmdash_core::Config;

/// Bind the configured address and serve until Ctrl-C.
pub async fn serve(config: Config) -> Result<()> {
    let addr = config.server.socket_addr()?;
    let state = AppState::from_config(&config)?;
    let filter = routes(state, &config.server);

    let (bound, server) = warp::serve(filter)
        .try_bind_with_graceful_shutdown(addr, shutdown_signal())
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("FarmDash listening on http://{}", bound);
    server.await;
    tracing::info!("FarmDash stopped");

    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => tracing::error!("Failed to listen for shutdown signal: {}", e),
    }
}
