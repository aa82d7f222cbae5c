use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    response::Response,
};
use onboard_contracts::ChatRequest;

use super::{ApiError, relay, state::AppState};

// POST /api/chat
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload?;
    if request.messages.is_empty() {
        return Err(ApiError::BadRequest("messages must not be empty".to_string()));
    }

    tracing::debug!(messages = request.messages.len(), "Received chat request");
    relay::forward(state.responder.as_ref(), request).await
}
