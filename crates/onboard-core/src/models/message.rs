use onboard_contracts::Role;
use serde::{Deserialize, Serialize};

/// A document the assistant cited for its reply
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentReference {
    pub id: String,
    pub title: String,
    /// Relevance score in percent (0-100)
    pub relevance: u8,
}

impl DocumentReference {
    pub fn new(id: impl Into<String>, title: impl Into<String>, relevance: u8) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            relevance: relevance.min(100),
        }
    }
}

/// Single chat message in a conversation.
///
/// Assistant messages start empty with `is_streaming` set and are filled in
/// place until the exchange completes; after that the content never changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub is_streaming: bool,
    /// Set only on committed failure notices
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documents: Option<Vec<DocumentReference>>,
    pub created_at: i64,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content.into(), false)
    }

    /// A completed assistant reply
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content.into(), false)
    }

    /// An empty assistant reply waiting for streamed content
    pub fn assistant_placeholder() -> Self {
        Self::new(Role::Assistant, String::new(), true)
    }

    pub fn with_documents(mut self, documents: Vec<DocumentReference>) -> Self {
        self.documents = Some(documents);
        self
    }

    /// Copy and markdown rendering only apply to settled messages.
    pub fn is_settled(&self) -> bool {
        !self.is_streaming
    }

    fn new(role: Role, content: String, is_streaming: bool) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content,
            is_streaming,
            is_error: false,
            documents: None,
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}
