//! Hosted OpenAI-compatible responder
//!
//! The model API answers with server-sent events; only the text deltas are
//! relayed so callers see the same raw-text contract as the local backend.

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use onboard_contracts::ChatRequest;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{ByteStream, Responder};
use crate::error::{AiError, Result};
use crate::http_client::build_http_client;
use crate::sse::SseDecoder;
use crate::upstream::response_to_error;

const DONE_SENTINEL: &str = "[DONE]";

/// OpenAI chat completions client used as a streaming responder
pub struct OpenAIResponder {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    system_prompt: Option<String>,
}

impl OpenAIResponder {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: build_http_client(),
            api_key: api_key.into(),
            model: "gpt-4o".to_string(),
            base_url: super::DEFAULT_OPENAI_URL.to_string(),
            system_prompt: None,
        }
    }

    /// Set the model to use
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set custom base URL (for API-compatible services)
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Prepend a system message to every conversation
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    fn build_body<'a>(&'a self, request: &'a ChatRequest) -> OpenAIRequest<'a> {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if let Some(prompt) = &self.system_prompt {
            messages.push(OpenAIMessage {
                role: "system",
                content: prompt,
            });
        }
        messages.extend(request.messages.iter().map(|turn| OpenAIMessage {
            role: turn.role.as_str(),
            content: &turn.content,
        }));

        OpenAIRequest {
            model: &self.model,
            messages,
            stream: true,
            user: request.user_id.as_deref(),
        }
    }
}

#[derive(Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAIMessage<'a>>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<&'a str>,
}

#[derive(Serialize)]
struct OpenAIMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize, Debug)]
struct OpenAIStreamResponse {
    #[serde(default)]
    choices: Vec<OpenAIStreamChoice>,
    #[serde(default)]
    error: Option<OpenAIStreamError>,
}

#[derive(Deserialize, Debug)]
struct OpenAIStreamChoice {
    #[serde(default)]
    delta: OpenAIStreamDelta,
}

#[derive(Deserialize, Debug, Default)]
struct OpenAIStreamDelta {
    content: Option<String>,
}

#[derive(Deserialize, Debug)]
struct OpenAIStreamError {
    #[serde(default)]
    message: String,
    #[serde(default, rename = "type")]
    kind: Option<String>,
}

/// Extract the text carried by one SSE `data` payload.
///
/// An error event or a payload that is not a completion chunk ends the
/// stream with an error; the reply would otherwise look complete.
fn delta_text(data: &str) -> Result<Option<String>> {
    let data = data.trim();
    if data.is_empty() || data == DONE_SENTINEL {
        return Ok(None);
    }

    let parsed: OpenAIStreamResponse = serde_json::from_str(data).map_err(|err| {
        AiError::Stream(format!("Malformed OpenAI stream event: {}", err))
    })?;

    if let Some(error) = parsed.error {
        return Err(AiError::Stream(match error.kind {
            Some(kind) => format!("OpenAI stream failed ({}): {}", kind, error.message),
            None => format!("OpenAI stream failed: {}", error.message),
        }));
    }

    let text: String = parsed
        .choices
        .into_iter()
        .filter_map(|choice| choice.delta.content)
        .collect();
    Ok((!text.is_empty()).then_some(text))
}

#[async_trait]
impl Responder for OpenAIResponder {
    fn name(&self) -> &str {
        "openai"
    }

    async fn open(&self, request: ChatRequest) -> Result<ByteStream> {
        tracing::debug!(
            model = %self.model,
            messages = request.messages.len(),
            "Opening OpenAI completion stream"
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&self.build_body(&request))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(response_to_error(response, self.name()).await);
        }

        let mut byte_stream = response.bytes_stream();
        Ok(Box::pin(async_stream::stream! {
            let mut decoder = SseDecoder::new();

            while let Some(chunk_result) = byte_stream.next().await {
                let chunk = match chunk_result {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        yield Err(AiError::Stream(format!("OpenAI stream interrupted: {}", e)));
                        return;
                    }
                };

                for data in decoder.push(&chunk) {
                    match delta_text(&data) {
                        Ok(Some(text)) => yield Ok(Bytes::from(text)),
                        Ok(None) => {}
                        Err(err) => {
                            tracing::warn!(error = %err, "OpenAI stream ended with an error event");
                            yield Err(err);
                            return;
                        }
                    }
                }
            }

            for data in decoder.finish() {
                match delta_text(&data) {
                    Ok(Some(text)) => yield Ok(Bytes::from(text)),
                    Ok(None) => {}
                    Err(err) => {
                        yield Err(err);
                        return;
                    }
                }
            }
        }))
    }
}
