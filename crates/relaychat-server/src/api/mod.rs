pub mod chat;
pub mod health;
pub mod mock_chat;
pub mod sse;
