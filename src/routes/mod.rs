//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Binds the listing endpoints, the chat session REST surface, and the
//! websocket under a single Axum router. The page routes of the demo UI
//! (`/`, `/dashboard`, `/projects`, `/chat`) map to `overview`,
//! `dashboard`, `projects`, and the chat session endpoints respectively.

pub mod chat;
pub mod listing;
pub mod ws;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Full API router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/overview", get(listing::overview))
        .route("/api/dashboard", get(listing::dashboard))
        .route("/api/projects", get(listing::list_projects))
        .route("/api/chat/sessions", post(chat::create_session))
        .route(
            "/api/chat/sessions/{id}",
            get(chat::get_session).delete(chat::delete_session),
        )
        .route("/api/chat/sessions/{id}/messages", post(chat::post_message))
        .route(
            "/api/chat/sessions/{id}/messages/{message_id}/copy",
            get(chat::copy_message),
        )
        .route("/api/ws", get(ws::handle_ws))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
