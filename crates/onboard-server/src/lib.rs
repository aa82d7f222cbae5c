//! Proxy endpoint between the onboarding chat client and its responders.
//!
//! The server holds no session memory: each request carries the full
//! conversation snapshot and the reply is relayed as it streams in.

pub mod api;
pub mod config;
pub mod telemetry;

use api::{chat::chat, health::health, langgraph::langgraph, state::AppState};
use axum::{
    Router,
    http::{Method, header},
    routing::{get, post},
};
use tower_http::cors::CorsLayer;

/// Build the HTTP router for `state`.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health))
        .route("/api/chat", post(chat))
        .route("/api/langgraph", post(langgraph))
        .fallback(api::error::not_found)
        .layer(cors)
        .with_state(state)
}
