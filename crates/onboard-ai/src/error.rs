//! Error types for responder calls

use thiserror::Error;

/// Responder error types
#[derive(Error, Debug)]
pub enum AiError {
    #[error("{responder} responded with status {status}: {message}")]
    Upstream {
        responder: String,
        status: u16,
        message: String,
    },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AiError {
    /// HTTP status reported by the upstream, if it answered at all.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias for responder operations
pub type Result<T> = std::result::Result<T, AiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_error_display() {
        let err = AiError::Upstream {
            responder: "local".to_string(),
            status: 503,
            message: "busy".to_string(),
        };
        assert_eq!(err.to_string(), "local responded with status 503: busy");
        assert_eq!(err.upstream_status(), Some(503));
    }

    #[test]
    fn test_non_upstream_error_has_no_status() {
        let err = AiError::InvalidRequest("no user turn".to_string());
        assert_eq!(err.upstream_status(), None);
    }
}
