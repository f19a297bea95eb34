//! Error types for the client pipeline.

use thiserror::Error;

/// Client pipeline error types
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    /// A terminal `error` event arrived mid-stream.
    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Response envelope missing or malformed: {0}")]
    Envelope(String),
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;
