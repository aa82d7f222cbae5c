//! Onboard AI - clients for the external responders behind the chat proxy
//!
//! This crate provides:
//! - A `Responder` trait that opens an unbuffered reply stream
//! - A local HTTP backend responder (JSON message history)
//! - A LangGraph backend responder (multipart form with caller identity)
//! - A hosted OpenAI-compatible responder (SSE translated to raw text)
//! - A scripted mock responder for tests

pub mod error;
mod http_client;
pub mod responder;
pub mod sse;
mod upstream;

pub use error::{AiError, Result};
pub use responder::{
    ByteStream, LangGraphResponder, LocalResponder, MockResponder, MockStep, OpenAIResponder,
    Responder, ResponderConfig, ResponderKind, build_responder,
};
