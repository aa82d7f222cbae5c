//! LangGraph backend responder
//!
//! The LangGraph service only takes the latest question plus the caller's
//! identity, posted as a multipart form.

use async_trait::async_trait;
use onboard_contracts::ChatRequest;
use reqwest::Client;
use reqwest::multipart::Form;

use super::{ByteStream, Responder, relay_body};
use crate::error::{AiError, Result};
use crate::http_client::build_http_client;
use crate::upstream::response_to_error;

pub struct LangGraphResponder {
    client: Client,
    url: String,
}

impl LangGraphResponder {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: build_http_client(),
            url: url.into(),
        }
    }

    fn build_form(request: &ChatRequest) -> Result<Form> {
        let question = request.latest_user_utterance().ok_or_else(|| {
            AiError::InvalidRequest("conversation has no user message".to_string())
        })?;

        Ok(Form::new()
            .text("user_id", request.user_id.clone().unwrap_or_default())
            .text("question", question.to_string())
            .text("name", request.name.clone().unwrap_or_default()))
    }
}

#[async_trait]
impl Responder for LangGraphResponder {
    fn name(&self) -> &str {
        "langgraph"
    }

    async fn open(&self, request: ChatRequest) -> Result<ByteStream> {
        let form = Self::build_form(&request)?;
        tracing::debug!(
            url = %self.url,
            user_id = request.user_id.as_deref().unwrap_or(""),
            "Forwarding question to LangGraph backend"
        );

        let response = self.client.post(&self.url).multipart(form).send().await?;
        if !response.status().is_success() {
            return Err(response_to_error(response, self.name()).await);
        }

        Ok(relay_body(response))
    }
}
