use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    response::Response,
};
use onboard_contracts::ChatRequest;

use super::{ApiError, relay, state::AppState};

// POST /api/langgraph
pub async fn langgraph(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Some(responder) = state.langgraph.as_ref() else {
        return Err(ApiError::Unavailable(
            "LangGraph backend is not configured".to_string(),
        ));
    };

    let Json(request) = payload?;
    if request.latest_user_utterance().is_none() {
        return Err(ApiError::BadRequest(
            "messages must contain a user message".to_string(),
        ));
    }

    tracing::debug!(
        user_id = request.user_id.as_deref().unwrap_or(""),
        "Received LangGraph request"
    );
    relay::forward(responder.as_ref(), request).await
}
