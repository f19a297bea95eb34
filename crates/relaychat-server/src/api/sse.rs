//! SSE encoding for the streaming chat path.

use std::convert::Infallible;

use async_stream::stream;
use axum::http::header;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use futures::Stream;
use futures::StreamExt;
use relaychat_contracts::StreamEvent;

fn encode(payload: &StreamEvent) -> Event {
    match Event::default()
        .event(payload.event_name())
        .json_data(payload)
    {
        Ok(event) => event,
        Err(err) => {
            tracing::error!(error = %err, "Failed to encode SSE payload");
            Event::default()
                .event("error")
                .data(r#"{"type":"error","error":"[AgentError] event encoding failed"}"#)
        }
    }
}

/// Bridge a fragment stream onto the wire contract: one `start`, a `chunk`
/// per non-empty fragment, then exactly one terminal event. The stream
/// ends, and the connection closes, on every exit path.
pub fn sse_events(
    fragments: impl Stream<Item = String> + Send + 'static,
) -> impl Stream<Item = Result<Event, Infallible>> + Send + 'static {
    stream! {
        yield Ok::<_, Infallible>(encode(&StreamEvent::Start));

        futures::pin_mut!(fragments);
        while let Some(fragment) = fragments.next().await {
            if fragment.is_empty() {
                continue;
            }
            let payload = StreamEvent::Chunk {
                content: fragment,
                timestamp: Some(Utc::now().to_rfc3339()),
            };
            match Event::default().event(payload.event_name()).json_data(&payload) {
                Ok(event) => yield Ok(event),
                Err(err) => {
                    // One terminal error event, then close.
                    tracing::error!(error = %err, "Failed to encode chunk event");
                    yield Ok(encode(&StreamEvent::Error {
                        error: format!("[AgentError] {}", err),
                    }));
                    return;
                }
            }
        }

        yield Ok(encode(&StreamEvent::Complete));
    }
}

/// Wrap an event stream as a `text/event-stream` response with the
/// no-cache and keep-alive headers the protocol requires.
pub fn sse_response(
    events: impl Stream<Item = Result<Event, Infallible>> + Send + 'static,
) -> Response {
    (
        [
            (header::CACHE_CONTROL, "no-cache"),
            (header::CONNECTION, "keep-alive"),
        ],
        Sse::new(events).keep_alive(KeepAlive::default()),
    )
        .into_response()
}
