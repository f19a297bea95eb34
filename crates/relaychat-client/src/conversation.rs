//! Conversation state and the HTTP chat client.

use bytes::Bytes;
use chrono::Utc;
use futures::StreamExt;
use futures::stream::BoxStream;
use relaychat_contracts::{ChatRequest, ChatResponse};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::consumer::TurnUpdate;
use crate::error::{ClientError, Result};

/// HTTP client for one relay server.
#[derive(Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    base_url: String,
}

impl ChatClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url)
    }

    /// Block mode: one request, one finished string.
    pub async fn send_block(&self, message: &str) -> Result<String> {
        let response = self
            .http
            .post(self.chat_url())
            .json(&ChatRequest {
                message: message.to_string(),
                stream: false,
            })
            .send()
            .await?;

        let status = response.status();
        let envelope: ChatResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Envelope(e.to_string()))?;

        if !status.is_success() || !envelope.success {
            let message = envelope
                .error
                .unwrap_or_else(|| format!("request failed with status {}", status));
            return Err(ClientError::Status {
                status: status.as_u16(),
                message,
            });
        }

        envelope
            .data
            .ok_or_else(|| ClientError::Envelope("missing data field".to_string()))
    }

    /// Streaming mode: open the event stream; feed the returned body to
    /// [`crate::consume_turn`].
    pub async fn open_stream(
        &self,
        message: &str,
    ) -> Result<BoxStream<'static, reqwest::Result<Bytes>>> {
        let response = self
            .http
            .post(self.chat_url())
            .json(&ChatRequest {
                message: message.to_string(),
                stream: true,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                message: "network response was not ok".to_string(),
            });
        }

        Ok(response.bytes_stream().boxed())
    }
}

/// Chat message roles in the visible history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub timestamp: String,
}

/// Ids of the message pair created for one turn.
#[derive(Debug, Clone)]
pub struct TurnIds {
    pub user_id: String,
    pub assistant_id: String,
}

struct ActiveTurn {
    user_id: String,
    assistant_id: String,
    prompt: String,
    cancel: CancellationToken,
}

/// Visible history for one conversation plus retry bookkeeping.
///
/// At most one turn is active; beginning a new one cancels the previous.
/// History lives only as long as this value; nothing is persisted.
#[derive(Default)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    failed_prompt: Option<String>,
    active: Option<ActiveTurn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn failed_prompt(&self) -> Option<&str> {
        self.failed_prompt.as_deref()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Record the user message and an empty assistant placeholder, and hand
    /// back the cancellation token for the new turn.
    pub fn begin_turn(&mut self, prompt: &str) -> (TurnIds, CancellationToken) {
        self.failed_prompt = None;
        if let Some(previous) = self.active.take() {
            previous.cancel.cancel();
        }

        let timestamp = Utc::now().to_rfc3339();
        let user_id = format!("user-{}", Uuid::new_v4());
        let assistant_id = format!("assistant-{}", Uuid::new_v4());

        self.messages.push(ChatMessage {
            id: user_id.clone(),
            role: Role::User,
            content: prompt.to_string(),
            timestamp: timestamp.clone(),
        });
        self.messages.push(ChatMessage {
            id: assistant_id.clone(),
            role: Role::Assistant,
            content: String::new(),
            timestamp,
        });

        let cancel = CancellationToken::new();
        self.active = Some(ActiveTurn {
            user_id: user_id.clone(),
            assistant_id: assistant_id.clone(),
            prompt: prompt.to_string(),
            cancel: cancel.clone(),
        });

        (
            TurnIds {
                user_id,
                assistant_id,
            },
            cancel,
        )
    }

    /// Mirror the latest transcript snapshot into the assistant message.
    pub fn apply_update(&mut self, update: &TurnUpdate) {
        let Some(active) = &self.active else {
            return;
        };
        let assistant_id = active.assistant_id.clone();
        if let Some(message) = self.messages.iter_mut().find(|m| m.id == assistant_id) {
            message.content = update.transcript.clone();
        }
    }

    /// Terminal bookkeeping for the active turn.
    ///
    /// Completed and stopped turns keep their text (or marker). A failed
    /// turn disappears from the history and its prompt becomes retryable,
    /// never a half-filled, unlabeled message.
    pub fn finish_turn(&mut self, outcome: &Result<TurnUpdate>) {
        let Some(active) = self.active.take() else {
            return;
        };

        match outcome {
            Ok(update) => {
                if let Some(message) = self
                    .messages
                    .iter_mut()
                    .find(|m| m.id == active.assistant_id)
                {
                    message.content = update.transcript.clone();
                }
            }
            Err(_) => {
                self.messages
                    .retain(|m| m.id != active.user_id && m.id != active.assistant_id);
                self.failed_prompt = Some(active.prompt);
            }
        }
    }

    /// Stop the active turn, if any.
    pub fn cancel_active(&self) -> bool {
        match &self.active {
            Some(active) => {
                active.cancel.cancel();
                true
            }
            None => false,
        }
    }

    /// Take the prompt of the last failed turn for resubmission.
    pub fn take_retry_prompt(&mut self) -> Option<String> {
        self.failed_prompt.take()
    }
}
