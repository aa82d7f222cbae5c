//! Deterministic mock responder for tests.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use onboard_contracts::ChatRequest;
use tokio::sync::Mutex;
use tokio::time::{Duration, sleep};

use super::{ByteStream, Responder};
use crate::error::{AiError, Result};

/// Scripted reply for one `open` call.
#[derive(Debug, Clone)]
pub enum MockStep {
    /// Stream these fragments, pausing `delay_ms` before each one.
    Chunks { chunks: Vec<String>, delay_ms: u64 },
    /// Fail before any byte is sent.
    Reject { status: u16, message: String },
    /// Stream `chunks`, then fail mid-body.
    BreakAfter { chunks: Vec<String>, message: String },
}

impl MockStep {
    pub fn chunks<I, S>(chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Chunks {
            chunks: chunks.into_iter().map(Into::into).collect(),
            delay_ms: 0,
        }
    }

    pub fn reject(status: u16, message: impl Into<String>) -> Self {
        Self::Reject {
            status,
            message: message.into(),
        }
    }

    pub fn break_after<I, S>(chunks: I, message: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::BreakAfter {
            chunks: chunks.into_iter().map(Into::into).collect(),
            message: message.into(),
        }
    }

    pub fn with_delay(mut self, delay: u64) -> Self {
        if let Self::Chunks { delay_ms, .. } = &mut self {
            *delay_ms = delay;
        }
        self
    }
}

/// A responder driven by scripted steps, recording every request it sees.
#[derive(Debug, Clone, Default)]
pub struct MockResponder {
    script: Arc<Mutex<VecDeque<MockStep>>>,
    requests: Arc<Mutex<Vec<ChatRequest>>>,
}

impl MockResponder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_steps(steps: Vec<MockStep>) -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::from(steps))),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub async fn push_step(&self, step: MockStep) {
        self.script.lock().await.push_back(step);
    }

    /// Requests received so far, in order.
    pub async fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().await.clone()
    }

    fn fallback_step(request: &ChatRequest) -> MockStep {
        let text = request
            .latest_user_utterance()
            .map(|content| format!("mock-echo: {}", content))
            .unwrap_or_else(|| "mock-ok".to_string());
        MockStep::chunks([text])
    }
}

#[async_trait]
impl Responder for MockResponder {
    fn name(&self) -> &str {
        "mock"
    }

    async fn open(&self, request: ChatRequest) -> Result<ByteStream> {
        let step = self
            .script
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Self::fallback_step(&request));
        self.requests.lock().await.push(request);

        match step {
            MockStep::Reject { status, message } => Err(AiError::Upstream {
                responder: "mock".to_string(),
                status,
                message,
            }),
            MockStep::Chunks { chunks, delay_ms } => Ok(Box::pin(async_stream::stream! {
                for chunk in chunks {
                    if delay_ms > 0 {
                        sleep(Duration::from_millis(delay_ms)).await;
                    }
                    yield Ok::<Bytes, AiError>(Bytes::from(chunk));
                }
            })),
            MockStep::BreakAfter { chunks, message } => Ok(Box::pin(async_stream::stream! {
                for chunk in chunks {
                    yield Ok(Bytes::from(chunk));
                }
                yield Err(AiError::Stream(message));
            })),
        }
    }
}
