//! Chat session controller
//!
//! All state changes of a conversation go through the event methods on
//! [`ChatController`]. They take `&mut self`, so two handlers can never
//! interleave on the same conversation, and the in-flight check in
//! [`ChatController::submit`] is a plain check-and-set on [`ChatState`].

use onboard_contracts::{ChatRequest, ChatTurn};
use serde::Serialize;
use tokio::sync::mpsc;

use crate::models::{Conversation, Message};

/// User-visible text that replaces a reply whose exchange failed
pub const FAILURE_NOTICE: &str = "Sorry, I encountered an error. Please try again later.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatState {
    #[default]
    Idle,
    /// Request sent, no reply bytes yet
    AwaitingResponse,
    /// Reply bytes are arriving
    Streaming,
}

impl ChatState {
    pub fn is_busy(&self) -> bool {
        !matches!(self, Self::Idle)
    }
}

/// Transient error indicator shown next to, not inside, the conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorNotice {
    pub message_id: String,
    pub detail: String,
}

/// Render notifications for whoever draws the conversation
#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    Appended(Message),
    Delta { id: String, chunk: String },
    Completed { id: String },
    Failed { id: String, notice: ErrorNotice },
}

#[derive(Debug, Clone)]
struct Identity {
    user_id: String,
    name: String,
}

#[derive(Debug, Default)]
pub struct ChatController {
    conversation: Conversation,
    input: String,
    state: ChatState,
    error: Option<ErrorNotice>,
    identity: Option<Identity>,
    events: Option<mpsc::UnboundedSender<ChatEvent>>,
}

impl ChatController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach caller identity to every outgoing request
    pub fn with_identity(mut self, user_id: impl Into<String>, name: impl Into<String>) -> Self {
        self.identity = Some(Identity {
            user_id: user_id.into(),
            name: name.into(),
        });
        self
    }

    /// Receive render events from now on; replaces any earlier subscriber.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<ChatEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.events = Some(tx);
        rx
    }

    pub fn state(&self) -> ChatState {
        self.state
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn messages(&self) -> &[Message] {
        self.conversation.messages()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn error(&self) -> Option<&ErrorNotice> {
        self.error.as_ref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Submit whatever is in the input buffer.
    pub fn submit_input(&mut self) -> Option<ChatRequest> {
        let text = self.input.clone();
        self.submit(&text)
    }

    /// Accept a user message and open a streaming placeholder for the reply.
    ///
    /// Returns the request to send, or `None` when the text is blank or a
    /// reply is already in flight. Rejected submissions change nothing.
    pub fn submit(&mut self, text: &str) -> Option<ChatRequest> {
        if self.state.is_busy() {
            tracing::debug!(state = ?self.state, "Ignoring submission while a reply is in flight");
            return None;
        }
        if text.trim().is_empty() {
            return None;
        }

        let mut turns = self.conversation.history();
        turns.push(ChatTurn::user(text));

        self.append(Message::user(text));
        self.input.clear();
        self.error = None;
        self.append(Message::assistant_placeholder());
        self.state = ChatState::AwaitingResponse;

        tracing::info!(history = turns.len(), "Submitted chat message");

        let request = ChatRequest::new(turns);
        Some(match &self.identity {
            Some(identity) => request.with_identity(&identity.user_id, &identity.name),
            None => request,
        })
    }

    /// Append a fragment of the reply, in arrival order.
    pub fn on_chunk_received(&mut self, chunk: &str) {
        if !self.state.is_busy() {
            tracing::debug!("Dropping chunk received outside an exchange");
            return;
        }
        if chunk.is_empty() {
            return;
        }
        let Some(message) = self.conversation.streaming_mut() else {
            return;
        };

        message.content.push_str(chunk);
        let id = message.id.clone();
        self.state = ChatState::Streaming;
        self.emit(ChatEvent::Delta {
            id,
            chunk: chunk.to_string(),
        });
    }

    /// Settle the streaming reply; its content is final from here on.
    pub fn on_stream_complete(&mut self) {
        if !self.state.is_busy() {
            tracing::debug!("Ignoring completion outside an exchange");
            return;
        }

        self.state = ChatState::Idle;
        let Some(message) = self.conversation.streaming_mut() else {
            return;
        };
        message.is_streaming = false;
        let id = message.id.clone();
        tracing::debug!(id = %id, length = message.content.len(), "Reply complete");
        self.emit(ChatEvent::Completed { id });
    }

    /// Replace the streaming reply with a failure notice and go back to idle.
    pub fn on_error(&mut self, err: impl std::fmt::Display) {
        if !self.state.is_busy() {
            tracing::debug!(error = %err, "Ignoring error outside an exchange");
            return;
        }

        self.state = ChatState::Idle;
        let detail = err.to_string();
        tracing::warn!(error = %detail, "Chat exchange failed");

        let Some(message) = self.conversation.streaming_mut() else {
            return;
        };
        message.content = FAILURE_NOTICE.to_string();
        message.is_streaming = false;
        message.is_error = true;

        let notice = ErrorNotice {
            message_id: message.id.clone(),
            detail,
        };
        self.error = Some(notice.clone());
        self.emit(ChatEvent::Failed {
            id: notice.message_id.clone(),
            notice,
        });
    }

    fn append(&mut self, message: Message) {
        self.conversation.push(message.clone());
        self.emit(ChatEvent::Appended(message));
    }

    fn emit(&mut self, event: ChatEvent) {
        let closed = self
            .events
            .as_ref()
            .is_some_and(|tx| tx.send(event).is_err());
        if closed {
            self.events = None;
        }
    }
}
