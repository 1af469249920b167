use async_openai::{types::CreateChatCompletionRequestArgs, Client};
use std::sync::Arc;
use tracing::debug;

pub use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
};

/// One completed chat request: reply text plus the token usage the backend
/// reported, when it reported any.
#[derive(Debug, Clone)]
pub struct ChatCompletionOutcome {
    pub content: String,
    pub total_tokens: Option<u32>,
}

#[derive(Clone)]
pub struct OpenAIClient {
    client: Arc<Client<async_openai::config::OpenAIConfig>>,
}

impl OpenAIClient {
    pub fn new(api_key: String) -> Self {
        let config = async_openai::config::OpenAIConfig::new().with_api_key(api_key);
        let client = Client::with_config(config);
        Self {
            client: Arc::new(client),
        }
    }

    /// Client against an OpenAI-compatible API at a custom base URL
    /// (DeepSeek, OpenRouter, proxies).
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        let config = async_openai::config::OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(base_url);
        let client = Client::with_config(config);
        Self {
            client: Arc::new(client),
        }
    }

    pub async fn chat_completion(
        &self,
        model: &str,
        messages: Vec<ChatCompletionRequestMessage>,
        max_tokens: u32,
        temperature: f32,
    ) -> anyhow::Result<ChatCompletionOutcome> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages(messages)
            .max_tokens(max_tokens)
            .temperature(temperature)
            .build()?;

        let response = self.client.chat().create(request).await?;
        let total_tokens = response.usage.as_ref().map(|u| u.total_tokens);
        debug!(model = %model, total_tokens = ?total_tokens, "Chat completion returned");

        if let Some(choice) = response.choices.first() {
            Ok(ChatCompletionOutcome {
                content: choice.message.content.clone().unwrap_or_default(),
                total_tokens,
            })
        } else {
            anyhow::bail!("No response choices from completion backend");
        }
    }
}
