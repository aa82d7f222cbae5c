//! Turns a responder stream into the proxy's streaming response.

use axum::{
    body::Body,
    http::header,
    response::{IntoResponse, Response},
};
use futures::TryStreamExt;
use onboard_ai::{ByteStream, Responder};
use onboard_contracts::ChatRequest;
use std::time::Instant;

use super::ApiError;

/// Forward `request` and relay the reply without buffering it.
///
/// Errors before the first byte become an `ApiError`; an error after that
/// aborts the body, which the client sees as a broken transfer.
pub async fn forward(responder: &dyn Responder, request: ChatRequest) -> Result<Response, ApiError> {
    let started = Instant::now();
    let stream = responder.open(request).await.map_err(|err| {
        tracing::error!(
            responder = responder.name(),
            error = %err,
            "Responder failed before streaming"
        );
        ApiError::from(err)
    })?;

    tracing::info!(
        responder = responder.name(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Relaying reply stream"
    );
    Ok(stream_response(stream, responder.name()))
}

pub fn stream_response(stream: ByteStream, responder: &str) -> Response {
    let responder = responder.to_string();
    let body = Body::from_stream(stream.inspect_err(move |err| {
        tracing::warn!(
            responder = %responder,
            error = %err,
            "Reply stream failed after headers were sent"
        );
    }));

    (
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        body,
    )
        .into_response()
}
