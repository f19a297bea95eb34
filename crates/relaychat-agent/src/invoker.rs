//! One request, one session: the entry point to the upstream agent.

use std::sync::Arc;

use uuid::Uuid;

use crate::config::AgentConfig;
use crate::error::{AgentError, Result};
use crate::runtime::{AgentInvocation, AgentReply, AgentRuntime};

/// Issues a single upstream call per user message.
///
/// Each call allocates a fresh session id. A failed call is never retried
/// here; the caller decides whether to resubmit the whole turn.
#[derive(Clone)]
pub struct AgentInvoker {
    runtime: Arc<dyn AgentRuntime>,
    agent_id: String,
    agent_alias_id: String,
}

impl AgentInvoker {
    pub fn new(runtime: Arc<dyn AgentRuntime>, config: &AgentConfig) -> Self {
        Self {
            runtime,
            agent_id: config.agent_id.clone(),
            agent_alias_id: config.agent_alias_id.clone(),
        }
    }

    pub async fn invoke(&self, message: &str) -> Result<AgentReply> {
        let session_id = Uuid::new_v4().to_string();
        let invocation = AgentInvocation {
            agent_id: self.agent_id.clone(),
            agent_alias_id: self.agent_alias_id.clone(),
            session_id: session_id.clone(),
            input_text: message.to_string(),
        };

        tracing::info!(agent_id = %self.agent_id, session_id = %session_id, "Invoking agent");

        match self.runtime.invoke(invocation).await {
            Ok(reply) => {
                tracing::info!(session_id = %session_id, "Agent response received");
                Ok(reply)
            }
            Err(err) => {
                tracing::error!(session_id = %session_id, error = %err, "Agent invocation failed");
                Err(match err {
                    AgentError::Invocation(_) => err,
                    other => AgentError::Invocation(other.to_string()),
                })
            }
        }
    }
}
