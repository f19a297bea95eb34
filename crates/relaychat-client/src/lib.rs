//! Client half of the RelayChat pipeline.
//!
//! Decodes the relay's Server-Sent Events byte stream back into a growing
//! transcript, tracks per-turn lifecycle and conversation history, and
//! paces the on-screen reveal independently of arrival rate.

pub mod consumer;
pub mod conversation;
pub mod error;
pub mod reveal;
pub mod sse;
pub mod turn;

pub use consumer::{TurnUpdate, consume_turn};
pub use conversation::{ChatClient, ChatMessage, Conversation, Role, TurnIds};
pub use error::{ClientError, Result};
pub use reveal::{RevealScheduler, RevealStep, RevealStyle, run_reveal};
pub use sse::SseParser;
pub use turn::{STOPPED_FALLBACK, Turn, TurnState};
