//! Conversation data model

mod conversation;
mod message;

pub use conversation::Conversation;
pub use message::{DocumentReference, Message};
