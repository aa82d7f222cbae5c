//! Local backend responder

use async_trait::async_trait;
use onboard_contracts::{ChatRequest, ChatTurn};
use reqwest::Client;
use serde::Serialize;

use super::{ByteStream, Responder, relay_body};
use crate::error::Result;
use crate::http_client::build_http_client;
use crate::upstream::response_to_error;

/// Forwards the message history as JSON to a local HTTP service
pub struct LocalResponder {
    client: Client,
    url: String,
}

impl LocalResponder {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: build_http_client(),
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[derive(Serialize)]
struct LocalRequest<'a> {
    messages: &'a [ChatTurn],
}

#[async_trait]
impl Responder for LocalResponder {
    fn name(&self) -> &str {
        "local"
    }

    async fn open(&self, request: ChatRequest) -> Result<ByteStream> {
        tracing::debug!(
            url = %self.url,
            messages = request.messages.len(),
            "Forwarding chat request to local backend"
        );

        let response = self
            .client
            .post(&self.url)
            .json(&LocalRequest {
                messages: &request.messages,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(response_to_error(response, self.name()).await);
        }

        Ok(relay_body(response))
    }
}
