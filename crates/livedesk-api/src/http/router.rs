//! Axum router configuration with middleware.
//!
//! Middleware: CORS (permissive -- the chat widget is served from the
//! site's own origin) and request tracing.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/live-counter", get(handlers::counter::live_counter))
        .route("/api/chat-message", post(handlers::chat::chat_message))
        .route("/api/chat-reply", post(handlers::chat::chat_reply))
        .route(
            "/api/chat-replies/{session_id}",
            get(handlers::chat::chat_replies),
        )
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Simple liveness check.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
