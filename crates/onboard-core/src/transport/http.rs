use async_trait::async_trait;
use futures::StreamExt;
use onboard_contracts::{ChatRequest, ErrorBody};
use reqwest::{Client, Response};

use super::{ChatTransport, TextStream, Utf8StreamDecoder};
use crate::error::{ChatError, Result};

/// Talks to the proxy endpoint over HTTP
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(Client::new(), endpoint)
    }

    pub fn with_client(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

async fn response_to_error(response: Response) -> ChatError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ErrorBody>(&body) {
        Ok(parsed) => parsed.error,
        Err(_) => body,
    };
    ChatError::Upstream { status, message }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn open(&self, request: ChatRequest) -> Result<TextStream> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(response_to_error(response).await);
        }

        let mut byte_stream = response.bytes_stream();
        Ok(Box::pin(async_stream::stream! {
            let mut decoder = Utf8StreamDecoder::new();

            while let Some(chunk_result) = byte_stream.next().await {
                let chunk = match chunk_result {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        yield Err(ChatError::Stream(e.to_string()));
                        return;
                    }
                };

                let text = decoder.decode(&chunk);
                if !text.is_empty() {
                    yield Ok(text);
                }
            }

            let tail = decoder.finish();
            if !tail.is_empty() {
                yield Ok(tail);
            }
        }))
    }
}
