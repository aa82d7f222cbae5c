use onboard_ai::{LangGraphResponder, Responder, build_responder};
use std::sync::Arc;

use crate::config::ServerConfig;

/// Responders shared by all handlers; nothing here is per-session.
#[derive(Clone)]
pub struct AppState {
    pub responder: Arc<dyn Responder>,
    pub langgraph: Option<Arc<dyn Responder>>,
}

impl AppState {
    pub fn new(responder: Arc<dyn Responder>) -> Self {
        Self {
            responder,
            langgraph: None,
        }
    }

    pub fn with_langgraph(mut self, responder: Arc<dyn Responder>) -> Self {
        self.langgraph = Some(responder);
        self
    }

    pub fn from_config(config: &ServerConfig) -> anyhow::Result<Self> {
        let state = Self::new(build_responder(&config.responder)?);
        Ok(match &config.langgraph_url {
            Some(url) => state.with_langgraph(Arc::new(LangGraphResponder::new(url))),
            None => state,
        })
    }
}
