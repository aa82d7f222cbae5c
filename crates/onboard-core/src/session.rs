//! Async driver for chat turns
//!
//! The controller sits behind a synchronous lock that is never held across
//! an await point: each event (submit, chunk, completion, failure) is
//! applied atomically, while the network waits happen outside the lock.
//! Concurrent `send` calls therefore race only on `submit`, and the loser
//! is rejected by the in-flight check.

use std::sync::Arc;

use futures::StreamExt;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::controller::{ChatController, ChatEvent, ChatState};
use crate::error::ChatError;
use crate::models::Message;
use crate::transport::ChatTransport;

#[derive(Debug)]
pub enum TurnOutcome {
    /// Blank text or a reply already in flight; nothing changed
    Rejected,
    Completed,
    Failed(ChatError),
}

impl TurnOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

#[derive(Clone)]
pub struct ChatSession {
    controller: Arc<Mutex<ChatController>>,
    transport: Arc<dyn ChatTransport>,
}

impl ChatSession {
    pub fn new(transport: Arc<dyn ChatTransport>) -> Self {
        Self::with_controller(ChatController::new(), transport)
    }

    pub fn with_controller(controller: ChatController, transport: Arc<dyn ChatTransport>) -> Self {
        Self {
            controller: Arc::new(Mutex::new(controller)),
            transport,
        }
    }

    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<ChatEvent> {
        self.controller.lock().subscribe()
    }

    pub fn state(&self) -> ChatState {
        self.controller.lock().state()
    }

    /// Snapshot of the conversation
    pub fn messages(&self) -> Vec<Message> {
        self.controller.lock().messages().to_vec()
    }

    /// Run `f` against the controller under the lock.
    pub fn with_controller_mut<R>(&self, f: impl FnOnce(&mut ChatController) -> R) -> R {
        f(&mut self.controller.lock())
    }

    /// Run one full turn: submit, await the reply and stream it in.
    ///
    /// Dropping the returned future mid-turn fails the turn, so the
    /// session never stays stuck with a reply in flight.
    pub async fn send(&self, text: &str) -> TurnOutcome {
        let request = self.controller.lock().submit(text);
        let Some(request) = request else {
            return TurnOutcome::Rejected;
        };
        let mut turn = InFlightTurn::new(self);

        let mut stream = match self.transport.open(request).await {
            Ok(stream) => stream,
            Err(err) => return turn.fail(err),
        };

        while let Some(item) = stream.next().await {
            match item {
                Ok(chunk) => {
                    self.controller.lock().on_chunk_received(&chunk);
                }
                Err(err) => return turn.fail(err),
            }
        }

        turn.settle();
        self.controller.lock().on_stream_complete();
        TurnOutcome::Completed
    }

    /// Send whatever is in the controller's input buffer.
    pub async fn send_input(&self) -> TurnOutcome {
        let text = self.controller.lock().input().to_string();
        self.send(&text).await
    }
}

/// Fails the turn it guards unless settled before being dropped.
struct InFlightTurn<'a> {
    session: &'a ChatSession,
    settled: bool,
}

impl<'a> InFlightTurn<'a> {
    fn new(session: &'a ChatSession) -> Self {
        Self {
            session,
            settled: false,
        }
    }

    fn settle(&mut self) {
        self.settled = true;
    }

    fn fail(mut self, err: ChatError) -> TurnOutcome {
        self.settle();
        self.session.controller.lock().on_error(&err);
        TurnOutcome::Failed(err)
    }
}

impl Drop for InFlightTurn<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        tracing::debug!("Turn abandoned before the reply finished");
        self.session.controller.lock().on_error("reply abandoned");
    }
}
