//! RelayChat HTTP relay.
//!
//! Validates chat requests, invokes the upstream agent once per turn, and
//! bridges the fragment stream onto Server-Sent Events.

pub mod api;
pub mod config;

use axum::Router;
use axum::http::{Method, header};
use axum::routing::{get, post};
use relaychat_agent::AgentInvoker;
use tower_http::cors::CorsLayer;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub invoker: AgentInvoker,
}

/// Build the router with permissive CORS; the layer also answers every
/// OPTIONS preflight with 200.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(api::health::health))
        .route("/api/chat", post(api::chat::chat))
        .route("/api/mock-chat", post(api::mock_chat::mock_chat))
        .layer(cors)
        .with_state(state)
}
