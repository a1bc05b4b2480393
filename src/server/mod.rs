pub mod handlers;
pub mod router;
pub mod upload;

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use crate::state::AppState;

/// Binds the configured address and serves until the process exits.
pub async fn serve(state: Arc<AppState>) -> anyhow::Result<()> {
    let bind_addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    let addr = listener.local_addr()?;

    tracing::info!("Server listening at http://{}", addr);
    tracing::info!("Models directory: {}", state.models.root().display());
    if !state.remote_chat.has_api_key() {
        tracing::warn!(
            "No API key for remote chat; set {} or remote_chat.api_key",
            state.config.remote_chat.api_key_env
        );
    }

    let app = router::router(state);
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
