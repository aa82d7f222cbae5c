//! Onboard Core - the client side of the onboarding assistant chat
//!
//! The [`ChatController`] owns one conversation and applies the events of a
//! streaming exchange to it. [`ChatSession`] drives a full turn against a
//! [`ChatTransport`], normally the proxy endpoint reached over HTTP.

pub mod controller;
pub mod error;
pub mod models;
pub mod session;
pub mod transport;

pub use controller::{ChatController, ChatEvent, ChatState, ErrorNotice, FAILURE_NOTICE};
pub use error::{ChatError, Result};
pub use models::{Conversation, DocumentReference, Message};
pub use onboard_contracts::{ChatRequest, ChatTurn, Role};
pub use session::{ChatSession, TurnOutcome};
pub use transport::{ChatTransport, HttpTransport, TextStream, Utf8StreamDecoder};
