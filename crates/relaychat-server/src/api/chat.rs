//! POST /api/chat: the request dispatcher.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde_json::Value;

use relaychat_agent::{AgentError, collect_reply, fragments};
use relaychat_contracts::ChatResponse;

use crate::AppState;
use crate::api::sse::{sse_events, sse_response};

fn now() -> String {
    Utc::now().to_rfc3339()
}

fn envelope(status: StatusCode, body: ChatResponse) -> Response {
    (status, Json(body)).into_response()
}

fn format_agent_error(err: &AgentError) -> String {
    format!("[AgentError] {}", err)
}

/// Dispatch one chat request.
///
/// Block mode returns the JSON envelope. Stream mode invokes the agent
/// first (an invocation failure is still a plain 500 envelope) and only
/// then commits to `text/event-stream`, where any later failure becomes a
/// terminal `error` event because status and headers are already on the
/// wire.
pub async fn chat(State(state): State<AppState>, Json(body): Json<Value>) -> Response {
    // Validated by hand: a missing or non-string `message` must produce
    // the envelope, not an extractor rejection.
    let message = match body.get("message").and_then(Value::as_str) {
        Some(message) if !message.is_empty() => message.to_string(),
        _ => {
            return envelope(
                StatusCode::BAD_REQUEST,
                ChatResponse::error("Message is required and must be a string", now()),
            );
        }
    };
    let stream = body.get("stream").and_then(Value::as_bool).unwrap_or(false);

    tracing::info!(stream, "Incoming chat message");

    let reply = match state.invoker.invoke(&message).await {
        Ok(reply) => reply,
        Err(err) => {
            tracing::error!(error = %err, "Chat request failed before streaming");
            return envelope(
                StatusCode::INTERNAL_SERVER_ERROR,
                ChatResponse::error(format_agent_error(&err), now()),
            );
        }
    };

    if !stream {
        let data = collect_reply(reply).await;
        tracing::info!("Block response ready");
        return envelope(StatusCode::OK, ChatResponse::ok(data, now()));
    }

    tracing::info!("Starting stream response");
    sse_response(sse_events(fragments(reply)))
}
