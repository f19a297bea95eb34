//! End-to-end pipeline: mock runtime -> dispatcher -> SSE bytes -> client
//! parser -> transcript.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use tower::ServiceExt;

use relaychat_agent::{AgentConfig, AgentInvoker, MockAgentRuntime, MockStep};
use relaychat_client::SseParser;
use relaychat_contracts::{ChatResponse, StreamEvent};
use relaychat_server::{AppState, router};

fn app(runtime: MockAgentRuntime) -> axum::Router {
    let config = AgentConfig::new("http://localhost:0", "agent-1", "alias-1");
    router(AppState {
        invoker: AgentInvoker::new(Arc::new(runtime), &config),
    })
}

fn chat_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn ouaf_script() -> Vec<MockStep> {
    vec![
        MockStep::chunk("The"),
        MockStep::chunk(" OUAF"),
        MockStep::chunk(" process"),
        MockStep::chunk(" involves..."),
    ]
}

#[tokio::test]
async fn streaming_turn_round_trips_through_the_client_parser() {
    let response = app(MockAgentRuntime::with_reply(ouaf_script()))
        .oneshot(chat_request(
            r#"{"message":"Summarize OUAF Process Flow","stream":true}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/event-stream"
    );

    let bytes = response.into_body().collect().await.unwrap().to_bytes();

    // Feed the wire one byte at a time: every possible split point,
    // including mid-payload.
    let mut parser = SseParser::new();
    let mut events = Vec::new();
    for byte in bytes.iter() {
        events.extend(parser.push(&[*byte]));
    }

    assert_eq!(events.first(), Some(&StreamEvent::Start));
    assert_eq!(events.last(), Some(&StreamEvent::Complete));

    let chunks: Vec<&str> = events
        .iter()
        .filter_map(|event| match event {
            StreamEvent::Chunk { content, .. } => Some(content.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(chunks.len(), 4);
    assert_eq!(chunks.concat(), "The OUAF process involves...");
}

#[tokio::test]
async fn streamed_chunks_match_the_block_collector() {
    let streamed_response = app(MockAgentRuntime::with_reply(ouaf_script()))
        .oneshot(chat_request(r#"{"message":"q","stream":true}"#))
        .await
        .unwrap();
    let bytes = streamed_response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes();

    let mut parser = SseParser::new();
    let streamed: String = parser
        .push(&bytes)
        .into_iter()
        .filter_map(|event| match event {
            StreamEvent::Chunk { content, .. } => Some(content),
            _ => None,
        })
        .collect();

    let block_response = app(MockAgentRuntime::with_reply(ouaf_script()))
        .oneshot(chat_request(r#"{"message":"q","stream":false}"#))
        .await
        .unwrap();
    let bytes = block_response.into_body().collect().await.unwrap().to_bytes();
    let envelope: ChatResponse = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(streamed.trim(), envelope.data.unwrap());
}

#[tokio::test]
async fn upstream_failure_mid_stream_degrades_to_visible_text() {
    let script = vec![MockStep::chunk("partial "), MockStep::error("boom")];
    let response = app(MockAgentRuntime::with_reply(script))
        .oneshot(chat_request(r#"{"message":"q","stream":true}"#))
        .await
        .unwrap();

    // Headers were already committed, so the failure must not change them.
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let mut parser = SseParser::new();
    let events = parser.push(&bytes);

    assert_eq!(events.last(), Some(&StreamEvent::Complete));
    let transcript: String = events
        .into_iter()
        .filter_map(|event| match event {
            StreamEvent::Chunk { content, .. } => Some(content),
            _ => None,
        })
        .collect();
    assert!(transcript.starts_with("partial "));
    assert!(transcript.contains("Stream error:"));
}

#[tokio::test]
async fn validation_failure_returns_an_envelope_not_a_stream() {
    let response = app(MockAgentRuntime::new())
        .oneshot(chat_request(r#"{"stream":true}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let envelope: ChatResponse = serde_json::from_slice(&bytes).unwrap();
    assert!(!envelope.success);
}

#[tokio::test]
async fn mock_chat_speaks_the_same_protocol() {
    let response = app(MockAgentRuntime::new())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/mock-chat")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let mut parser = SseParser::new();
    let events = parser.push(&bytes);

    assert_eq!(events.first(), Some(&StreamEvent::Start));
    assert_eq!(events.last(), Some(&StreamEvent::Complete));
    let transcript: String = events
        .into_iter()
        .filter_map(|event| match event {
            StreamEvent::Chunk { content, .. } => Some(content),
            _ => None,
        })
        .collect();
    assert!(transcript.contains("mocked response"));
}
