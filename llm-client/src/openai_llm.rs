//! OpenAI-compatible [`CompletionClient`] implementation.

use anyhow::Result;
use async_trait::async_trait;
use openai_client::OpenAIClient;
use prompt::PromptMessage;
use tracing::debug;

use crate::config::AiConfig;
use crate::{prompt_message_to_openai, Completion, CompletionClient};

/// Completion client over an OpenAI-compatible chat completions API.
#[derive(Clone)]
pub struct OpenAiCompletion {
    client: OpenAIClient,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl OpenAiCompletion {
    /// Builds a client from backend configuration (key, optional base URL,
    /// model, sampling bounds).
    pub fn from_config(config: &AiConfig) -> Self {
        let client = match &config.base_url {
            Some(base_url) => {
                OpenAIClient::with_base_url(config.api_key.clone(), base_url.clone())
            }
            None => OpenAIClient::new(config.api_key.clone()),
        };
        Self {
            client,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }
}

#[async_trait]
impl CompletionClient for OpenAiCompletion {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, messages: Vec<PromptMessage>) -> Result<Completion> {
        debug!(model = %self.model, turns = messages.len(), "Requesting chat completion");
        let messages = messages
            .iter()
            .map(prompt_message_to_openai)
            .collect::<Result<Vec<_>>>()?;
        let outcome = self
            .client
            .chat_completion(&self.model, messages, self.max_tokens, self.temperature)
            .await?;
        Ok(Completion {
            content: outcome.content,
            total_tokens: outcome.total_tokens,
        })
    }
}
