//! Responder module - the external systems that actually produce replies
//!
//! Every responder exposes the same contract: `open` resolves once the
//! upstream has answered with a success status, and the returned stream
//! yields raw text fragments in arrival order without buffering the body.

mod langgraph;
mod local;
mod mock;
mod openai;

use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use onboard_contracts::ChatRequest;
use serde::Deserialize;

use crate::error::{AiError, Result};

pub use langgraph::LangGraphResponder;
pub use local::LocalResponder;
pub use mock::{MockResponder, MockStep};
pub use openai::OpenAIResponder;

/// Reply body as a stream of raw text fragments
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// An external system that answers a conversation snapshot
#[async_trait]
pub trait Responder: Send + Sync {
    /// Short name used in logs and error messages
    fn name(&self) -> &str;

    /// Forward the request and return the reply stream once headers arrive
    async fn open(&self, request: ChatRequest) -> Result<ByteStream>;
}

/// Relay an upstream body unchanged, one network read per fragment.
pub(crate) fn relay_body(response: reqwest::Response) -> ByteStream {
    use futures::TryStreamExt;

    Box::pin(response.bytes_stream().map_err(AiError::from))
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResponderKind {
    /// Local HTTP service receiving the JSON message history
    #[default]
    Local,
    /// Hosted OpenAI-compatible model API
    OpenAI,
}

impl ResponderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::OpenAI => "openai",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "local" => Some(Self::Local),
            "openai" => Some(Self::OpenAI),
            _ => None,
        }
    }
}

/// Settings for the responder behind `/api/chat`
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ResponderConfig {
    #[serde(default)]
    pub kind: ResponderKind,
    /// Endpoint or base URL; the kind's default when unset
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default)]
    pub system_prompt: Option<String>,
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            kind: ResponderKind::default(),
            url: None,
            model: None,
            api_key_env: default_api_key_env(),
            system_prompt: None,
        }
    }
}

impl ResponderConfig {
    /// The configured URL, or the default for this kind.
    pub fn resolved_url(&self) -> String {
        match (&self.url, self.kind) {
            (Some(url), _) => url.clone(),
            (None, ResponderKind::Local) => DEFAULT_LOCAL_URL.to_string(),
            (None, ResponderKind::OpenAI) => DEFAULT_OPENAI_URL.to_string(),
        }
    }
}

pub const DEFAULT_LOCAL_URL: &str = "http://0.0.0.0:8000/query";
pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1";

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

/// Build the responder described by `config`.
pub fn build_responder(config: &ResponderConfig) -> Result<Arc<dyn Responder>> {
    match config.kind {
        ResponderKind::Local => Ok(Arc::new(LocalResponder::new(config.resolved_url()))),
        ResponderKind::OpenAI => {
            let api_key = std::env::var(&config.api_key_env).map_err(|_| {
                AiError::Config(format!(
                    "{} must be set for the openai responder",
                    config.api_key_env
                ))
            })?;

            let mut responder = OpenAIResponder::new(api_key).with_base_url(config.resolved_url());
            if let Some(model) = &config.model {
                responder = responder.with_model(model);
            }
            if let Some(prompt) = &config.system_prompt {
                responder = responder.with_system_prompt(prompt);
            }
            Ok(Arc::new(responder))
        }
    }
}
