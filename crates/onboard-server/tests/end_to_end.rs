//! Controller, proxy and a fake backend wired together over real sockets

use std::sync::Arc;

use onboard_ai::{LocalResponder, MockResponder, MockStep};
use onboard_core::{ChatSession, FAILURE_NOTICE, HttpTransport, TurnOutcome};
use onboard_server::{api::state::AppState, router};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Serve the proxy on an ephemeral port and return its chat endpoint.
async fn spawn_proxy(state: AppState) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.unwrap();
    });
    format!("http://{}/api/chat", addr)
}

fn disable_system_proxy_for_tests() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        // Safety: set once for the process before any HTTP clients are built.
        unsafe {
            std::env::set_var("ONBOARD_DISABLE_SYSTEM_PROXY", "1");
        }
    });
}

fn session_for(endpoint: String) -> ChatSession {
    let client = reqwest_client();
    ChatSession::new(Arc::new(HttpTransport::with_client(client, endpoint)))
}

fn reqwest_client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_turn_through_local_backend() {
    disable_system_proxy_for_tests();
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("Start with the **Set up development environment** step."),
        )
        .expect(1)
        .mount(&backend)
        .await;

    let responder = LocalResponder::new(format!("{}/query", backend.uri()));
    let endpoint = spawn_proxy(AppState::new(Arc::new(responder))).await;
    let session = session_for(endpoint);

    assert!(session.send("Where do I begin?").await.is_completed());
    let messages = session.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(
        messages[1].content,
        "Start with the **Set up development environment** step."
    );
    assert!(!messages[1].is_streaming);
}

#[tokio::test]
async fn test_backend_failure_becomes_failure_notice() {
    disable_system_proxy_for_tests();
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model crashed"))
        .mount(&backend)
        .await;

    let responder = LocalResponder::new(backend.uri());
    let session = session_for(spawn_proxy(AppState::new(Arc::new(responder))).await);

    match session.send("test").await {
        TurnOutcome::Failed(err) => assert!(err.to_string().contains("model crashed")),
        other => panic!("unexpected outcome: {other:?}"),
    }
    let messages = session.messages();
    assert_eq!(messages[1].content, FAILURE_NOTICE);

    // The session is immediately usable again.
    assert!(!matches!(
        session.send("retry").await,
        TurnOutcome::Rejected
    ));
}

#[tokio::test]
async fn test_mid_stream_break_reaches_controller() {
    disable_system_proxy_for_tests();
    let responder = MockResponder::from_steps(vec![MockStep::break_after(
        ["Partial answer"],
        "upstream reset",
    )]);
    let session = session_for(spawn_proxy(AppState::new(Arc::new(responder))).await);

    assert!(matches!(session.send("Hello").await, TurnOutcome::Failed(_)));
    assert_eq!(session.messages()[1].content, FAILURE_NOTICE);
}
