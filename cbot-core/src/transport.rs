//! Transport abstraction for delivering replies.
//!
//! [`Transport`] is transport-agnostic; cbot-telegram implements it via teloxide.

use async_trait::async_trait;

/// Abstraction for sending plain-text messages to a chat. Implementations map
/// to a messaging platform (e.g. Telegram).
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends text to the given chat and returns the platform-assigned message id.
    async fn send_text(&self, chat_id: i64, text: &str) -> anyhow::Result<i64>;
}
