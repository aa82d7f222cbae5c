//! End-to-end turns through `ChatSession`

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use onboard_core::{
    ChatError, ChatEvent, ChatRequest, ChatSession, ChatState, ChatTransport, ChatTurn,
    FAILURE_NOTICE, HttpTransport, Role, TextStream, TurnOutcome,
};
use tokio::sync::Mutex;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// What the scripted transport does for one request
enum Script {
    Reply { chunks: Vec<&'static str>, delay_ms: u64 },
    RejectConnect,
    BreakAfter(Vec<&'static str>),
}

struct ScriptedTransport {
    scripts: Mutex<Vec<Script>>,
    seen: Mutex<Vec<ChatRequest>>,
}

impl ScriptedTransport {
    fn new(mut scripts: Vec<Script>) -> Arc<Self> {
        scripts.reverse();
        Arc::new(Self {
            scripts: Mutex::new(scripts),
            seen: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl ChatTransport for ScriptedTransport {
    async fn open(&self, request: ChatRequest) -> onboard_core::Result<TextStream> {
        self.seen.lock().await.push(request);
        let script = self
            .scripts
            .lock()
            .await
            .pop()
            .expect("no script left for request");

        match script {
            Script::RejectConnect => Err(ChatError::Stream("connection refused".to_string())),
            Script::Reply { chunks, delay_ms } => Ok(Box::pin(async_stream::stream! {
                for chunk in chunks {
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                    yield Ok::<String, ChatError>(chunk.to_string());
                }
            })),
            Script::BreakAfter(chunks) => Ok(Box::pin(async_stream::stream! {
                for chunk in chunks {
                    yield Ok(chunk.to_string());
                }
                yield Err(ChatError::Stream("connection reset".to_string()));
            })),
        }
    }
}

fn reply(chunks: Vec<&'static str>) -> Script {
    Script::Reply {
        chunks,
        delay_ms: 0,
    }
}

#[tokio::test]
async fn test_hello_turn_completes() {
    let transport = ScriptedTransport::new(vec![reply(vec!["Hi", " there", "!"])]);
    let session = ChatSession::new(transport.clone());

    let outcome = session.send("Hello").await;
    assert!(outcome.is_completed());

    let messages = session.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[0].content, "Hello");
    assert_eq!(messages[1].role, Role::Assistant);
    assert_eq!(messages[1].content, "Hi there!");
    assert!(!messages[1].is_streaming);
    assert_eq!(session.state(), ChatState::Idle);
}

#[tokio::test]
async fn test_transport_rejection_leaves_session_resumable() {
    let transport = ScriptedTransport::new(vec![Script::RejectConnect, reply(vec!["ok"])]);
    let session = ChatSession::new(transport.clone());

    let outcome = session.send("test").await;
    assert!(matches!(outcome, TurnOutcome::Failed(ChatError::Stream(_))));
    assert_eq!(session.state(), ChatState::Idle);

    let messages = session.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].content, "test");
    assert_eq!(messages[1].content, FAILURE_NOTICE);
    assert!(messages[1].is_error);

    assert!(session.send("test again").await.is_completed());
    assert_eq!(session.messages().len(), 4);

    // The failure notice is not part of the history sent upstream.
    let seen = transport.seen.lock().await;
    assert_eq!(
        seen[1].messages,
        vec![ChatTurn::user("test"), ChatTurn::user("test again")]
    );
}

#[tokio::test]
async fn test_mid_stream_failure() {
    let transport = ScriptedTransport::new(vec![Script::BreakAfter(vec!["Par", "tial"])]);
    let session = ChatSession::new(transport);

    let outcome = session.send("Hello").await;
    assert!(matches!(outcome, TurnOutcome::Failed(_)));
    let messages = session.messages();
    assert_eq!(messages[1].content, FAILURE_NOTICE);
    assert!(session.with_controller_mut(|c| c.error().is_some()));
}

#[tokio::test]
async fn test_concurrent_send_is_rejected() {
    let transport = ScriptedTransport::new(vec![Script::Reply {
        chunks: vec!["slow", " reply"],
        delay_ms: 50,
    }]);
    let session = ChatSession::new(transport.clone());

    let first = tokio::spawn({
        let session = session.clone();
        async move { session.send("first").await }
    });

    // Wait until the first turn has claimed the conversation.
    while session.state() == ChatState::Idle {
        tokio::task::yield_now().await;
    }
    assert!(matches!(session.send("second").await, TurnOutcome::Rejected));

    assert!(first.await.unwrap().is_completed());
    let messages = session.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].content, "slow reply");
    assert_eq!(transport.seen.lock().await.len(), 1);
}

#[tokio::test]
async fn test_abandoned_turn_frees_the_session() {
    let transport = ScriptedTransport::new(vec![
        Script::Reply {
            chunks: vec!["never", " arrives"],
            delay_ms: 500,
        },
        reply(vec!["ok"]),
    ]);
    let session = ChatSession::new(transport.clone());

    let timed_out = tokio::time::timeout(Duration::from_millis(20), session.send("Hello")).await;
    assert!(timed_out.is_err());

    assert_eq!(session.state(), ChatState::Idle);
    let messages = session.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].content, FAILURE_NOTICE);
    assert!(!messages[1].is_streaming);

    assert!(session.send("Hello again").await.is_completed());
    assert_eq!(session.messages()[3].content, "ok");
}

#[tokio::test]
async fn test_blank_send_is_rejected() {
    let transport = ScriptedTransport::new(vec![]);
    let session = ChatSession::new(transport.clone());
    assert!(matches!(session.send("   ").await, TurnOutcome::Rejected));
    assert!(session.messages().is_empty());
    assert!(transport.seen.lock().await.is_empty());
}

#[tokio::test]
async fn test_events_follow_the_turn() {
    let transport = ScriptedTransport::new(vec![reply(vec!["a", "b"])]);
    let session = ChatSession::new(transport);
    let mut events = session.subscribe();

    session.send("Hello").await;

    let mut deltas = String::new();
    let mut completed = false;
    while let Ok(event) = events.try_recv() {
        match event {
            ChatEvent::Delta { chunk, .. } => deltas.push_str(&chunk),
            ChatEvent::Completed { .. } => completed = true,
            _ => {}
        }
    }
    assert_eq!(deltas, "ab");
    assert!(completed);
}

#[tokio::test]
async fn test_send_input_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string("Welcome aboard!"),
        )
        .mount(&server)
        .await;

    let transport = Arc::new(HttpTransport::new(format!("{}/api/chat", server.uri())));
    let session = ChatSession::new(transport);
    session.with_controller_mut(|c| c.set_input("Hi"));

    assert!(session.send_input().await.is_completed());
    let messages = session.messages();
    assert_eq!(messages[1].content, "Welcome aboard!");
    assert!(session.with_controller_mut(|c| c.input().is_empty()));
}

#[tokio::test]
async fn test_http_failure_status_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_json(serde_json::json!({
            "error": "Failed to process chat request: upstream down"
        })))
        .mount(&server)
        .await;

    let session = ChatSession::new(Arc::new(HttpTransport::new(server.uri())));
    match session.send("Hello").await {
        TurnOutcome::Failed(ChatError::Upstream { status, message }) => {
            assert_eq!(status, 502);
            assert!(message.contains("upstream down"));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(session.messages()[1].content, FAILURE_NOTICE);
}
