use reqwest::Response;

use crate::error::AiError;

// Keeps large or sensitive upstream bodies out of client-facing errors.
const MAX_ERROR_BODY: usize = 512;

pub(crate) async fn response_to_error(response: Response, responder: &str) -> AiError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();

    AiError::Upstream {
        responder: responder.to_string(),
        status,
        message: truncate_body(body),
    }
}

fn truncate_body(body: String) -> String {
    if body.len() <= MAX_ERROR_BODY {
        return body;
    }

    let mut end = MAX_ERROR_BODY;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... [truncated]", &body[..end])
}
