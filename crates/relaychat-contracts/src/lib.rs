//! Shared wire contracts for the RelayChat boundary.
//!
//! The server encodes these types and the browser-facing client decodes
//! them, so the request body, the response envelope, and the SSE payload
//! grammar all live in exactly one place.

use serde::{Deserialize, Serialize};

/// Inbound chat request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// `true` for Server-Sent Events, `false` for one block response.
    #[serde(default)]
    pub stream: bool,
}

/// JSON envelope for block-mode responses and HTTP-level errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl ChatResponse {
    pub fn ok(data: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data.into()),
            error: None,
            timestamp: Some(timestamp.into()),
        }
    }

    pub fn error(error: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            timestamp: Some(timestamp.into()),
        }
    }
}

/// One Server-Sent Event payload.
///
/// The variant name appears twice on the wire: as the SSE `event:` field
/// and as the `type` tag inside the JSON `data:` line. A stream carries
/// exactly one `start`, zero or more `chunk`s, then exactly one terminal
/// `complete` or `error`; arrival order is the contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamEvent {
    Start,
    Chunk {
        content: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        timestamp: Option<String>,
    },
    Complete,
    Error { error: String },
}

impl StreamEvent {
    /// The SSE `event:` field name for this payload.
    pub fn event_name(&self) -> &'static str {
        match self {
            StreamEvent::Start => "start",
            StreamEvent::Chunk { .. } => "chunk",
            StreamEvent::Complete => "complete",
            StreamEvent::Error { .. } => "error",
        }
    }

    /// Whether this event ends the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Complete | StreamEvent::Error { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_defaults_to_block_mode() {
        let request: ChatRequest = serde_json::from_str(r#"{"message":"hi"}"#).unwrap();
        assert!(!request.stream);
    }

    #[test]
    fn start_event_wire_shape() {
        let json = serde_json::to_string(&StreamEvent::Start).unwrap();
        assert_eq!(json, r#"{"type":"start"}"#);
    }

    #[test]
    fn chunk_event_round_trips() {
        let event = StreamEvent::Chunk {
            content: "Hello".to_string(),
            timestamp: Some("2026-01-01T00:00:00Z".to_string()),
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: StreamEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
        assert_eq!(event.event_name(), "chunk");
    }

    #[test]
    fn error_event_is_terminal() {
        let event: StreamEvent =
            serde_json::from_str(r#"{"type":"error","error":"boom"}"#).unwrap();
        assert!(event.is_terminal());
        assert_eq!(event.event_name(), "error");
        assert!(!StreamEvent::Start.is_terminal());
    }

    #[test]
    fn error_envelope_omits_data() {
        let body =
            serde_json::to_string(&ChatResponse::error("bad request", "t")).unwrap();
        assert!(!body.contains("data"));
        assert!(body.contains(r#""success":false"#));
    }
}
