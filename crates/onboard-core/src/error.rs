//! Error types for chat exchanges

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Failed to reach chat endpoint: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Chat endpoint responded with status {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("Chat stream interrupted: {0}")]
    Stream(String),
}

pub type Result<T> = std::result::Result<T, ChatError>;
