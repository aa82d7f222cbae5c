use onboard_contracts::ChatTurn;
use serde::Serialize;

use super::Message;

/// Ordered, append-only list of messages for one chat session.
///
/// Only the controller appends or touches the trailing streaming message;
/// everyone else gets shared references.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// The message currently being filled from an in-flight reply
    pub fn streaming(&self) -> Option<&Message> {
        self.messages.last().filter(|message| message.is_streaming)
    }

    /// Settled, non-error messages as they are forwarded upstream.
    pub fn history(&self) -> Vec<ChatTurn> {
        self.messages
            .iter()
            .filter(|message| message.is_settled() && !message.is_error)
            .map(|message| ChatTurn {
                role: message.role,
                content: message.content.clone(),
            })
            .collect()
    }

    pub(crate) fn push(&mut self, message: Message) {
        debug_assert!(
            self.streaming().is_none(),
            "cannot append while a message is streaming"
        );
        self.messages.push(message);
    }

    pub(crate) fn streaming_mut(&mut self) -> Option<&mut Message> {
        self.messages
            .last_mut()
            .filter(|message| message.is_streaming)
    }
}

impl<'a> IntoIterator for &'a Conversation {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}
