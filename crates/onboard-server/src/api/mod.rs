pub mod chat;
pub mod error;
pub mod health;
pub mod langgraph;
pub mod relay;
pub mod state;

pub use error::ApiError;
