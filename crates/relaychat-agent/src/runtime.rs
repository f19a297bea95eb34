//! The agent-invocation capability and its implementations.

use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::Arc;

use async_stream::stream;
use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use tokio::sync::Mutex;
use tokio::time::{Duration, sleep};

use crate::config::AgentConfig;
use crate::error::{AgentError, Result};
use crate::http_client::build_http_client;

/// Asynchronous sequence of raw byte chunks from the provider.
pub type ByteChunkStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// One upstream call: which agent, which session, what text.
#[derive(Debug, Clone, serde::Serialize)]
pub struct AgentInvocation {
    pub agent_id: String,
    pub agent_alias_id: String,
    pub session_id: String,
    pub input_text: String,
}

/// Raw provider-shaped response handle.
///
/// Owned by the invoker for the duration of one call; never retried.
pub struct AgentReply {
    pub session_id: String,
    /// Byte-chunk sequence; `None` when the provider sent no completion.
    pub completion: Option<ByteChunkStream>,
}

impl std::fmt::Debug for AgentReply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentReply")
            .field("session_id", &self.session_id)
            .field("completion", &self.completion.as_ref().map(|_| "<stream>"))
            .finish()
    }
}

/// Capability consumed by the invoker: issue exactly one upstream request
/// and hand back its completion stream.
#[async_trait]
pub trait AgentRuntime: Send + Sync {
    async fn invoke(&self, invocation: AgentInvocation) -> Result<AgentReply>;
}

/// HTTP agent-invocation service client.
pub struct HttpAgentRuntime {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpAgentRuntime {
    pub fn new(config: &AgentConfig) -> Self {
        Self {
            client: build_http_client(config.connect_timeout),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    fn invoke_url(&self, invocation: &AgentInvocation) -> String {
        format!(
            "{}/agents/{}/aliases/{}/sessions/{}/text",
            self.endpoint,
            invocation.agent_id,
            invocation.agent_alias_id,
            invocation.session_id
        )
    }
}

#[async_trait]
impl AgentRuntime for HttpAgentRuntime {
    async fn invoke(&self, invocation: AgentInvocation) -> Result<AgentReply> {
        let mut request = self
            .client
            .post(self.invoke_url(&invocation))
            .json(&serde_json::json!({ "inputText": invocation.input_text }));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AgentError::Invocation(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::Invocation(format!(
                "agent service returned {}: {}",
                status, body
            )));
        }

        let completion = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(classify_transport_error))
            .boxed();

        Ok(AgentReply {
            session_id: invocation.session_id,
            completion: Some(completion),
        })
    }
}

/// Mid-stream transport failures: a decode failure means the provider sent
/// something the transport could not parse; everything else is a plain
/// stream error.
fn classify_transport_error(err: reqwest::Error) -> AgentError {
    if err.is_decode() {
        AgentError::MalformedResponse
    } else {
        AgentError::Stream(err.to_string())
    }
}

/// Scripted step for mock completions.
#[derive(Debug, Clone)]
pub enum MockStep {
    /// Yield one byte chunk after an optional delay.
    Chunk { bytes: Vec<u8>, delay_ms: u64 },
    /// Fail mid-stream.
    Error(String),
    /// Fail mid-stream as unparseable provider output.
    Malformed,
}

impl MockStep {
    pub fn chunk(text: impl Into<String>) -> Self {
        Self::Chunk {
            bytes: text.into().into_bytes(),
            delay_ms: 0,
        }
    }

    pub fn raw(bytes: Vec<u8>) -> Self {
        Self::Chunk { bytes, delay_ms: 0 }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(message.into())
    }

    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        if let Self::Chunk { delay_ms: d, .. } = &mut self {
            *d = delay_ms;
        }
        self
    }
}

/// One scripted reply.
#[derive(Debug, Clone)]
pub enum MockReply {
    Steps(Vec<MockStep>),
    /// Provider accepted the call but sent no completion stream.
    NoCompletion,
    /// The call itself fails.
    Fail(String),
}

/// A deterministic mock runtime driven by scripted replies.
///
/// With an empty script it echoes the input, so ad-hoc use never hangs.
#[derive(Clone, Default)]
pub struct MockAgentRuntime {
    replies: Arc<Mutex<VecDeque<MockReply>>>,
}

impl MockAgentRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reply(steps: Vec<MockStep>) -> Self {
        let runtime = Self::new();
        runtime
            .replies
            .try_lock()
            .expect("fresh mock runtime is uncontended")
            .push_back(MockReply::Steps(steps));
        runtime
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        Self::with_reply(vec![MockStep::chunk(text)])
    }

    pub async fn push_reply(&self, reply: MockReply) {
        self.replies.lock().await.push_back(reply);
    }
}

#[async_trait]
impl AgentRuntime for MockAgentRuntime {
    async fn invoke(&self, invocation: AgentInvocation) -> Result<AgentReply> {
        let reply = self.replies.lock().await.pop_front();
        let steps = match reply {
            None => vec![MockStep::chunk(format!(
                "mock-echo: {}",
                invocation.input_text
            ))],
            Some(MockReply::Steps(steps)) => steps,
            Some(MockReply::NoCompletion) => {
                return Ok(AgentReply {
                    session_id: invocation.session_id,
                    completion: None,
                });
            }
            Some(MockReply::Fail(message)) => {
                return Err(AgentError::Invocation(message));
            }
        };

        let completion = stream! {
            for step in steps {
                match step {
                    MockStep::Chunk { bytes, delay_ms } => {
                        if delay_ms > 0 {
                            sleep(Duration::from_millis(delay_ms)).await;
                        }
                        yield Ok(Bytes::from(bytes));
                    }
                    MockStep::Error(message) => {
                        yield Err(AgentError::Stream(message));
                        return;
                    }
                    MockStep::Malformed => {
                        yield Err(AgentError::MalformedResponse);
                        return;
                    }
                }
            }
        };

        Ok(AgentReply {
            session_id: invocation.session_id,
            completion: Some(Box::pin(completion)),
        })
    }
}
