//! # Completion client abstraction
//!
//! Defines the [`CompletionClient`] trait, an OpenAI-compatible
//! implementation, and [`CompletionService`], the retry/failover orchestrator
//! that turns a turn sequence into a reply payload without ever surfacing an
//! error to the caller.

use anyhow::Result;
use async_trait::async_trait;
use openai_client::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
};
use prompt::{MessageRole, PromptMessage};

mod config;
mod failover;
mod openai_llm;

pub use config::AiConfig;
pub use failover::{
    AiResponse, CompletionService, RetryPolicy, EMPTY_REPLY_FALLBACK, FAILURE_REPLY_PREFIX,
};
pub use openai_llm::OpenAiCompletion;

/// One successful completion: reply text and the backend-reported token count.
#[derive(Debug, Clone)]
pub struct Completion {
    pub content: String,
    pub total_tokens: Option<u32>,
}

/// Completion backend interface: fulfil a role-tagged turn sequence.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Model identifier this client completes with (for result attribution).
    fn model(&self) -> &str;

    /// Requests one completion for the given turns.
    async fn complete(&self, messages: Vec<PromptMessage>) -> Result<Completion>;
}

/// Converts a single [`PromptMessage`] into the OpenAI API message format.
fn prompt_message_to_openai(msg: &PromptMessage) -> Result<ChatCompletionRequestMessage> {
    let content = msg.content.clone();
    let openai_msg: ChatCompletionRequestMessage = match msg.role {
        MessageRole::System => ChatCompletionRequestSystemMessageArgs::default()
            .content(content)
            .build()?
            .into(),
        MessageRole::User => ChatCompletionRequestUserMessageArgs::default()
            .content(content)
            .build()?
            .into(),
        MessageRole::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
            .content(content)
            .build()?
            .into(),
    };
    Ok(openai_msg)
}
