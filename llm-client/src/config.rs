//! Completion backend configuration: per-provider defaults and env loading.

use anyhow::{Context, Result};
use std::env;

/// Default sampling temperature for completions.
const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Default cap on generated tokens per completion.
const DEFAULT_MAX_TOKENS: u32 = 1000;

/// Default model and base URL for a named provider. Unknown providers get the
/// openai defaults. Pure lookup; no hidden branching elsewhere.
fn provider_profile(provider: &str) -> (&'static str, Option<&'static str>) {
    match provider {
        "deepseek" => ("deepseek-chat", Some("https://api.deepseek.com")),
        "openrouter" => (
            "deepseek/deepseek-chat",
            Some("https://openrouter.ai/api/v1"),
        ),
        _ => ("gpt-4o-mini", None),
    }
}

/// Immutable configuration for one completion backend.
#[derive(Debug, Clone)]
pub struct AiConfig {
    pub api_key: String,
    pub model: String,
    pub provider: String,
    pub base_url: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl AiConfig {
    /// Configuration for the given provider with its profile defaults.
    pub fn for_provider(api_key: String, provider: &str) -> Self {
        let (default_model, default_base_url) = provider_profile(provider);
        Self {
            api_key,
            model: default_model.to_string(),
            provider: provider.to_string(),
            base_url: default_base_url.map(String::from),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    /// Primary backend from env: `AI_API_KEY` (or `OPENAI_API_KEY`) required;
    /// `AI_PROVIDER`, `AI_MODEL` (or `OPENAI_MODEL`), `AI_BASE_URL` optional
    /// with provider-profile defaults.
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("AI_API_KEY")
            .or_else(|_| env::var("OPENAI_API_KEY"))
            .context("AI_API_KEY or OPENAI_API_KEY is required")?;
        let provider = env::var("AI_PROVIDER")
            .unwrap_or_else(|_| "openai".to_string())
            .to_lowercase();

        let mut config = Self::for_provider(api_key, &provider);
        if let Ok(model) = env::var("AI_MODEL").or_else(|_| env::var("OPENAI_MODEL")) {
            config.model = model;
        }
        if let Ok(base_url) = env::var("AI_BASE_URL") {
            config.base_url = Some(base_url);
        }
        Ok(config)
    }

    /// Secondary backend from env, present only when `FALLBACK_AI_API_KEY` is
    /// set; `FALLBACK_AI_PROVIDER`, `FALLBACK_AI_MODEL`, `FALLBACK_AI_BASE_URL`
    /// follow the same defaulting rules as the primary.
    pub fn fallback_from_env() -> Option<Self> {
        let api_key = env::var("FALLBACK_AI_API_KEY").ok()?;
        let provider = env::var("FALLBACK_AI_PROVIDER")
            .unwrap_or_else(|_| "openai".to_string())
            .to_lowercase();

        let mut config = Self::for_provider(api_key, &provider);
        if let Ok(model) = env::var("FALLBACK_AI_MODEL") {
            config.model = model;
        }
        if let Ok(base_url) = env::var("FALLBACK_AI_BASE_URL") {
            config.base_url = Some(base_url);
        }
        Some(config)
    }
}
