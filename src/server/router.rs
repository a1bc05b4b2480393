use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::core::config::ServerConfig;
use crate::server::handlers::{chat, health, models, training};
use crate::state::AppState;

/// Creates the application router.
///
/// Besides the JSON API it serves `public/` as static files, with `/kimi`
/// mapped to the remote chat page.
pub fn router(state: Arc<AppState>) -> Router {
    let cors_layer = build_cors_layer(&state.config.server);
    let body_limit = DefaultBodyLimit::max(state.config.server.max_upload_bytes);
    let public_dir = state.public_dir.clone();

    Router::new()
        .route("/health", get(health::health))
        .route("/models", get(models::list_models))
        .route("/upload", post(training::upload))
        .route("/extract-text", post(training::extract_text))
        .route("/chat", post(chat::chat))
        .route("/api/kimi-chat", post(chat::remote_chat))
        .route_service("/kimi", ServeFile::new(public_dir.join("kimi.html")))
        .fallback_service(ServeDir::new(public_dir))
        .with_state(state)
        .layer(body_limit)
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http())
}

fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let allowed_origins = config
        .cors_allowed_origins
        .iter()
        .map(|origin| origin.trim())
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect::<Vec<_>>();

    let allow_origin = if allowed_origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(allowed_origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::ACCEPT, header::CONTENT_TYPE])
}
