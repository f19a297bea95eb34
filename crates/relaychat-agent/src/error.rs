//! Error types for the agent pipeline.

use thiserror::Error;

/// Agent pipeline error types
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Agent configuration error: {0}")]
    Config(String),

    /// The upstream call could not be started.
    #[error("Failed to invoke agent: {0}")]
    Invocation(String),

    /// The completion stream failed after the call was accepted.
    #[error("Agent stream error: {0}")]
    Stream(String),

    /// The provider returned bytes the transport could not decode.
    #[error("Agent response could not be parsed")]
    MalformedResponse,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;
