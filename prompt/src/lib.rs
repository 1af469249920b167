//! # Prompt
//!
//! Formats stored chat context into the role-tagged turn sequence sent to a
//! completion backend.
//!
//! ## Construction order
//!
//! 1. One system turn: the base prompt plus a fixed instruction forbidding the
//!    assistant from prefixing replies with its own name, plus (when a
//!    participant history is supplied) a "Relevant user history" block.
//! 2. Chat history in chronological order: turns whose display name matches
//!    the bot (leading `@` stripped, case-insensitive) become `assistant`
//!    turns with the raw body; everything else becomes a `user` turn with a
//!    `name: ` prefix.
//! 3. The current message as a final `user` turn, unless the previously
//!    emitted turn already contains it as a substring, which happens when the
//!    message was persisted and re-read into the history before assembly.

use cbot_core::ChatMessage;

/// Role of a turn, one-to-one with Chat Completions API `role` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// A single role-tagged turn.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptMessage {
    pub role: MessageRole,
    pub content: String,
}

impl PromptMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Appended to every system turn so the model does not sign its replies.
pub const NO_SELF_REFERENCE_INSTRUCTION: &str = "IMPORTANT: When responding, do NOT include your username in your response. Simply provide a natural response without identifying yourself by name.";

/// Section title for the participant-history block in the system turn.
pub const SECTION_USER_HISTORY: &str = "Relevant user history:";

/// Display name used in the participant-history block when a message has none.
pub const FALLBACK_DISPLAY_NAME: &str = "User";

/// Returns true when the message was authored by the bot account: display
/// names compared case-insensitively with any leading `@` stripped from both
/// sides. Messages without a display name are never classified as the bot.
fn is_bot_message(message: &ChatMessage, bot_username: Option<&str>) -> bool {
    let (Some(bot_username), Some(display_name)) = (bot_username, message.display_name.as_deref())
    else {
        return false;
    };
    display_name.trim_start_matches('@').to_lowercase()
        == bot_username.trim_start_matches('@').to_lowercase()
}

/// Builds the turn sequence for one completion request. See the module docs
/// for the exact ordering and dedup rules.
pub fn build_chat_prompt(
    base_prompt: &str,
    chat_history: &[ChatMessage],
    current_message: &str,
    bot_username: Option<&str>,
    user_history: &[ChatMessage],
) -> Vec<PromptMessage> {
    let mut system_content = format!("{}\n\n{}", base_prompt, NO_SELF_REFERENCE_INSTRUCTION);

    if !user_history.is_empty() {
        let history_lines: Vec<String> = user_history
            .iter()
            .map(|m| {
                format!(
                    "{}: {}",
                    m.display_name.as_deref().unwrap_or(FALLBACK_DISPLAY_NAME),
                    m.body
                )
            })
            .collect();
        system_content.push_str(&format!(
            "\n\n{}\n{}",
            SECTION_USER_HISTORY,
            history_lines.join("\n")
        ));
    }

    let mut messages = vec![PromptMessage::system(system_content)];

    for message in chat_history {
        if is_bot_message(message, bot_username) {
            messages.push(PromptMessage::assistant(message.body.clone()));
        } else {
            messages.push(PromptMessage::user(format!(
                "{}: {}",
                message.display_name_or_id(),
                message.body
            )));
        }
    }

    // The current message is usually already the newest history entry; only
    // append it when the last emitted turn does not contain it.
    let already_present = messages
        .last()
        .is_some_and(|m| m.content.contains(current_message));
    if !already_present {
        messages.push(PromptMessage::user(current_message));
    }

    messages
}
