//! Agent invocation and response adaptation.
//!
//! Everything provider-shaped stays behind the [`AgentRuntime`] capability:
//! an asynchronous sequence of byte chunks, possibly empty, possibly
//! erroring mid-sequence. The rest of the pipeline only ever sees decoded
//! text fragments.

pub mod collect;
pub mod config;
pub mod decode;
pub mod error;
mod http_client;
pub mod invoker;
pub mod runtime;
pub mod stream;

pub use collect::collect_reply;
pub use config::AgentConfig;
pub use error::{AgentError, Result};
pub use invoker::AgentInvoker;
pub use runtime::{
    AgentInvocation, AgentReply, AgentRuntime, HttpAgentRuntime, MockAgentRuntime, MockReply,
    MockStep,
};
pub use stream::fragments;
