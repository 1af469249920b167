//! # cbot-core
//!
//! Core types for the chat-context relay bot: the [`ChatMessage`] record, the
//! [`Transport`] send abstraction, the [`Responder`] trigger decision, and
//! tracing initialization. Transport-agnostic; used by context-store, prompt,
//! and cbot-telegram.

pub mod logger;
pub mod responder;
pub mod transport;
pub mod types;

pub use logger::init_tracing;
pub use responder::Responder;
pub use transport::Transport;
pub use types::{ChatMessage, SEQUENCE_ID_UNASSIGNED};
