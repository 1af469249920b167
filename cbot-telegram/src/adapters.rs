//! Adapters from Telegram (teloxide) types to the core message record.

use cbot_core::ChatMessage;

/// Wraps a teloxide Message for conversion to the stored [`ChatMessage`].
pub struct TelegramMessageWrapper<'a>(pub &'a teloxide::types::Message);

impl TelegramMessageWrapper<'_> {
    /// Converts to the stored record. Returns `None` for messages without
    /// text or without a sender (channel posts, service messages).
    pub fn to_chat_message(&self) -> Option<ChatMessage> {
        let text = self.0.text()?;
        let from = self.0.from.as_ref()?;
        Some(ChatMessage {
            author_id: from.id.0 as i64,
            display_name: from.username.clone(),
            body: text.to_string(),
            created_at: self.0.date,
            message_sequence_id: self.0.id.0 as i64,
        })
    }
}
