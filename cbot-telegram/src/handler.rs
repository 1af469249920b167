//! The relay pipeline: persist → trim → decide → assemble → complete →
//! deliver → persist reply.
//!
//! Store failures never stop the pipeline: appends and trims degrade with a
//! warning, history reads degrade to an empty context, and the completion
//! service always returns a deliverable payload.

use std::sync::Arc;

use anyhow::Result;
use cbot_core::{ChatMessage, Responder, Transport, SEQUENCE_ID_UNASSIGNED};
use context_store::ContextStore;
use llm_client::CompletionService;
use prompt::build_chat_prompt;
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument, warn};

use crate::config::BotProfile;

/// Sent when the generated reply could not be delivered.
const MSG_PROCESSING_FAILED: &str = "Sorry, something went wrong while processing your message.";

/// The bot's own platform account, used to author persisted replies.
/// Populated from `get_me` at startup; `username` falls back to the
/// configured value until then.
#[derive(Debug, Clone, Default)]
pub struct BotIdentity {
    pub id: i64,
    pub username: Option<String>,
}

/// Handles one incoming chat message end to end.
pub struct RelayHandler {
    store: ContextStore,
    responder: Responder,
    completion: Arc<CompletionService>,
    transport: Arc<dyn Transport>,
    identity: Arc<RwLock<BotIdentity>>,
    profile: BotProfile,
    /// Shown by `/start` and `/status`, e.g. `gpt-4o-mini (openai)`.
    model_label: String,
}

impl RelayHandler {
    pub fn new(
        store: ContextStore,
        completion: Arc<CompletionService>,
        transport: Arc<dyn Transport>,
        identity: Arc<RwLock<BotIdentity>>,
        profile: BotProfile,
        model_label: String,
    ) -> Self {
        let responder = Responder::new(profile.trigger_words.clone());
        Self {
            store,
            responder,
            completion,
            transport,
            identity,
            profile,
            model_label,
        }
    }

    /// Full pipeline for one incoming text message.
    #[instrument(skip(self, message), fields(user_id = message.author_id))]
    pub async fn handle_message(&self, chat_id: i64, message: ChatMessage) -> Result<()> {
        let author_id = message.author_id;

        // Persist to both scopes. A store outage degrades context quality but
        // must not silence the bot.
        if let Err(e) = self.store.add_message(chat_id, &message).await {
            warn!(error = %e, chat_id, "step: chat-scope append failed, continuing");
        }
        if let Err(e) = self.store.add_user_message(chat_id, author_id, &message).await {
            warn!(error = %e, chat_id, user_id = author_id, "step: user-scope append failed, continuing");
        }
        if let Err(e) = self
            .store
            .trim_chat(chat_id, self.profile.context_window_size)
            .await
        {
            warn!(error = %e, chat_id, "step: chat-scope trim failed, continuing");
        }
        if self.profile.trim_user_context {
            if let Err(e) = self
                .store
                .trim_user(chat_id, author_id, self.profile.user_context_window_size)
                .await
            {
                warn!(error = %e, chat_id, user_id = author_id, "step: user-scope trim failed, continuing");
            }
        }

        let identity = self.identity.read().await.clone();
        if !self
            .responder
            .should_respond(&message.body, identity.username.as_deref())
        {
            debug!(chat_id, user_id = author_id, "step: no trigger, staying silent");
            return Ok(());
        }

        self.generate_and_send(chat_id, author_id, &message.body, &identity)
            .await;
        Ok(())
    }

    /// Reads both histories (degraded to empty on store outage), assembles
    /// the prompt, requests a completion and delivers the reply, then
    /// persists the reply to both scopes.
    async fn generate_and_send(
        &self,
        chat_id: i64,
        author_id: i64,
        message_text: &str,
        identity: &BotIdentity,
    ) {
        let chat_history = self
            .store
            .chat_history(chat_id, self.profile.context_window_size)
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, chat_id, "Chat history unavailable, generating with empty context");
                Vec::new()
            });
        let user_history = self
            .store
            .user_history(chat_id, author_id, self.profile.user_context_window_size)
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, chat_id, user_id = author_id, "User history unavailable, generating without it");
                Vec::new()
            });

        let turns = build_chat_prompt(
            &self.profile.base_prompt,
            &chat_history,
            message_text,
            identity.username.as_deref(),
            &user_history,
        );
        info!(
            chat_id,
            user_id = author_id,
            turns = turns.len(),
            "step: submitting to completion service"
        );

        let response = self.completion.generate(turns).await;

        match self.transport.send_text(chat_id, &response.content).await {
            Ok(delivered_id) => {
                let mut reply = ChatMessage::new(
                    identity.id,
                    identity.username.clone(),
                    response.content.clone(),
                    SEQUENCE_ID_UNASSIGNED,
                );
                reply.message_sequence_id = delivered_id;

                if let Err(e) = self.store.add_message(chat_id, &reply).await {
                    warn!(error = %e, chat_id, "step: reply chat-scope append failed");
                }
                if let Err(e) = self.store.add_user_message(chat_id, author_id, &reply).await {
                    warn!(error = %e, chat_id, user_id = author_id, "step: reply user-scope append failed");
                }

                info!(
                    chat_id,
                    user_id = author_id,
                    tokens_used = ?response.tokens_used,
                    model_used = ?response.model_used,
                    "Reply delivered"
                );
            }
            Err(e) => {
                error!(error = %e, chat_id, "Failed to deliver reply");
                let _ = self.transport.send_text(chat_id, MSG_PROCESSING_FAILED).await;
            }
        }
    }

    // ---------- Command surface ----------

    /// `/start`: greeting with capabilities and current setup.
    pub fn start_text(&self) -> String {
        let trigger_words = if self.profile.trigger_words.is_empty() {
            "none configured".to_string()
        } else {
            self.profile.trigger_words.join(", ")
        };
        format!(
            "Hi! I am a chat bot that keeps conversation context.\n\n\
             I can:\n\
             • reply when mentioned\n\
             • keep conversation context per participant\n\
             • react to trigger words: {}\n\n\
             Current setup:\n\
             • context window: {} messages\n\
             • model: {}\n\n\
             Just mention me or use a trigger word!",
            trigger_words, self.profile.context_window_size, self.model_label
        )
    }

    /// `/clear`: drops the chat scope and confirms.
    pub async fn clear_text(&self, chat_id: i64) -> String {
        match self.store.clear_chat(chat_id).await {
            Ok(()) => "Chat context cleared! Starting from a clean slate.".to_string(),
            Err(e) => {
                warn!(error = %e, chat_id, "Clear command failed");
                "Sorry, the context store is unavailable right now.".to_string()
            }
        }
    }

    /// `/status`: current context size, window, participants and model.
    pub async fn status_text(&self, chat_id: i64) -> String {
        let context_size = self.store.chat_len(chat_id).await.unwrap_or_else(|e| {
            warn!(error = %e, chat_id, "Status: context size unavailable");
            0
        });
        let participants = self
            .store
            .participants(chat_id)
            .await
            .map(|users| users.len())
            .unwrap_or_else(|e| {
                warn!(error = %e, chat_id, "Status: participants unavailable");
                0
            });
        let prompt_preview: String = self.profile.base_prompt.chars().take(100).collect();

        format!(
            "Chat context status:\n\n\
             • messages in context: {}\n\
             • window size: {}\n\
             • tracked participants: {}\n\
             • model: {}\n\
             • base prompt: {}...\n\n\
             Commands:\n\
             /start - greeting\n\
             /clear - clear the chat context\n\
             /status - show this status",
            context_size,
            self.profile.context_window_size,
            participants,
            self.model_label,
            prompt_preview
        )
    }
}
