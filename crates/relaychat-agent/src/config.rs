//! Upstream agent connection settings.

use std::env;
use std::time::Duration;

use crate::error::{AgentError, Result};

const ENDPOINT_VAR: &str = "RELAYCHAT_AGENT_ENDPOINT";
const AGENT_ID_VAR: &str = "RELAYCHAT_AGENT_ID";
const AGENT_ALIAS_ID_VAR: &str = "RELAYCHAT_AGENT_ALIAS_ID";
const API_KEY_VAR: &str = "RELAYCHAT_AGENT_API_KEY";
const TIMEOUT_VAR: &str = "RELAYCHAT_AGENT_TIMEOUT_SECS";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for the agent-invocation service.
///
/// Constructed fail-fast: every missing required variable is reported in a
/// single error, before any request is made.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub endpoint: String,
    pub agent_id: String,
    pub agent_alias_id: String,
    pub api_key: Option<String>,
    pub connect_timeout: Duration,
}

impl AgentConfig {
    pub fn new(
        endpoint: impl Into<String>,
        agent_id: impl Into<String>,
        agent_alias_id: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            agent_id: agent_id.into(),
            agent_alias_id: agent_alias_id.into(),
            api_key: None,
            connect_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Load from the environment, naming all missing variables at once.
    pub fn from_env() -> Result<Self> {
        let endpoint = env::var(ENDPOINT_VAR).ok();
        let agent_id = env::var(AGENT_ID_VAR).ok();
        let agent_alias_id = env::var(AGENT_ALIAS_ID_VAR).ok();

        let mut missing = Vec::new();
        if endpoint.is_none() {
            missing.push(ENDPOINT_VAR);
        }
        if agent_id.is_none() {
            missing.push(AGENT_ID_VAR);
        }
        if agent_alias_id.is_none() {
            missing.push(AGENT_ALIAS_ID_VAR);
        }
        let (Some(endpoint), Some(agent_id), Some(agent_alias_id)) =
            (endpoint, agent_id, agent_alias_id)
        else {
            return Err(AgentError::Config(format!(
                "Missing required environment variables: {}",
                missing.join(", ")
            )));
        };

        let connect_timeout = env::var(TIMEOUT_VAR)
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        Ok(Self {
            endpoint,
            agent_id,
            agent_alias_id,
            api_key: env::var(API_KEY_VAR).ok(),
            connect_timeout,
        })
    }
}
