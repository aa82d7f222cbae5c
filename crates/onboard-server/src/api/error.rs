use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use onboard_ai::AiError;
use onboard_contracts::ErrorBody;

/// Failure reported to the caller as a JSON `ErrorBody`
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unavailable(String),
    NotFound,
    Responder(AiError),
}

impl From<AiError> for ApiError {
    fn from(err: AiError) -> Self {
        Self::Responder(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Responder(AiError::InvalidRequest(_)) => StatusCode::BAD_REQUEST,
            Self::Responder(AiError::Config(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Responder(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::BadRequest(message) => format!("Invalid chat request: {}", message),
            Self::Unavailable(message) => message.clone(),
            Self::NotFound => "Not found".to_string(),
            Self::Responder(err) => format!("Failed to process chat request: {}", err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(ErrorBody::new(self.message()))).into_response()
    }
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound
}
