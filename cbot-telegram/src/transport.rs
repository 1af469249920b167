//! Teloxide-based implementation of the core [`Transport`] seam.

use async_trait::async_trait;
use cbot_core::Transport;
use teloxide::prelude::*;
use teloxide::types::ChatId;

/// Sends plain-text messages through the Telegram Bot API.
pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn send_text(&self, chat_id: i64, text: &str) -> anyhow::Result<i64> {
        let sent = self.bot.send_message(ChatId(chat_id), text).await?;
        Ok(sent.id.0 as i64)
    }
}
