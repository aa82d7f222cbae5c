//! Transports carry a [`ChatRequest`] to whatever produces the reply.

mod decoder;
mod http;

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use onboard_contracts::ChatRequest;

use crate::error::Result;

pub use decoder::Utf8StreamDecoder;
pub use http::HttpTransport;

/// Reply text fragments, directly appendable in arrival order
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send the request; resolves once the reply has started.
    async fn open(&self, request: ChatRequest) -> Result<TextStream>;
}
