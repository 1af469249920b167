//! Application settings, loaded once at startup from environment variables.
//!
//! Required: `TELEGRAM_BOT_TOKEN` and an AI key (`AI_API_KEY` or
//! `OPENAI_API_KEY`). Everything else has documented defaults. Missing
//! required values fail startup before any message is processed.

use anyhow::{Context, Result};
use std::env;

use context_store::RedisConfig;
use llm_client::AiConfig;

/// Default base prompt when `BASE_PROMPT` is unset.
const DEFAULT_BASE_PROMPT: &str = "You are a helpful assistant in a Telegram chat. You maintain context and respond when mentioned. Always respond naturally without including your username.";

/// Default trigger words when `TRIGGER_WORDS` is unset.
const DEFAULT_TRIGGER_WORDS: &str = "бот,bot,помощь,help,вопрос,question,вика";

/// Telegram access settings.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    /// Configured bot username; superseded by `get_me` at startup when the
    /// platform reports one.
    pub bot_username: Option<String>,
}

/// Conversation behavior settings.
#[derive(Debug, Clone)]
pub struct BotProfile {
    pub base_prompt: String,
    /// Rolling window for whole-chat history.
    pub context_window_size: usize,
    /// Rolling window for one participant's history.
    pub user_context_window_size: usize,
    /// When false the participant scope is bounded only by the 24-hour
    /// expiry, not by an explicit trim.
    pub trim_user_context: bool,
    pub trigger_words: Vec<String>,
}

/// All settings, immutable for the process lifetime.
#[derive(Debug, Clone)]
pub struct Settings {
    pub telegram: TelegramConfig,
    pub ai: AiConfig,
    pub fallback_ai: Option<AiConfig>,
    pub redis: RedisConfig,
    pub bot: BotProfile,
    pub log_file: String,
}

fn env_parsed<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl Settings {
    /// Loads all settings from the environment. `token` overrides
    /// `TELEGRAM_BOT_TOKEN` when given (CLI flag).
    pub fn from_env(token: Option<String>) -> Result<Self> {
        let bot_token = match token {
            Some(token) => token,
            None => env::var("TELEGRAM_BOT_TOKEN").context("TELEGRAM_BOT_TOKEN is required")?,
        };
        let bot_username = env::var("BOT_USERNAME").ok();

        let ai = AiConfig::from_env()?;
        let fallback_ai = AiConfig::fallback_from_env();

        let redis = RedisConfig {
            host: env::var("REDIS_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: env_parsed("REDIS_PORT", 6379),
            password: env::var("REDIS_PASSWORD").ok().filter(|p| !p.is_empty()),
            db: env_parsed("REDIS_DB", 0),
        };

        let base_prompt =
            env::var("BASE_PROMPT").unwrap_or_else(|_| DEFAULT_BASE_PROMPT.to_string());
        let trigger_words_raw =
            env::var("TRIGGER_WORDS").unwrap_or_else(|_| DEFAULT_TRIGGER_WORDS.to_string());
        let trigger_words: Vec<String> = trigger_words_raw
            .split(',')
            .map(|w| w.trim().to_string())
            .filter(|w| !w.is_empty())
            .collect();

        let bot = BotProfile {
            base_prompt,
            context_window_size: env_parsed("CONTEXT_WINDOW_SIZE", 50),
            user_context_window_size: env_parsed("USER_CONTEXT_WINDOW_SIZE", 20),
            trim_user_context: env_parsed("TRIM_USER_CONTEXT", true),
            trigger_words,
        };

        let log_file = env::var("LOG_FILE").unwrap_or_else(|_| "logs/cbot.log".to_string());

        Ok(Self {
            telegram: TelegramConfig {
                bot_token,
                bot_username,
            },
            ai,
            fallback_ai,
            redis,
            bot,
            log_file,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for name in [
            "TELEGRAM_BOT_TOKEN",
            "BOT_USERNAME",
            "AI_API_KEY",
            "OPENAI_API_KEY",
            "AI_PROVIDER",
            "AI_MODEL",
            "OPENAI_MODEL",
            "AI_BASE_URL",
            "FALLBACK_AI_API_KEY",
            "FALLBACK_AI_PROVIDER",
            "FALLBACK_AI_MODEL",
            "FALLBACK_AI_BASE_URL",
            "REDIS_HOST",
            "REDIS_PORT",
            "REDIS_PASSWORD",
            "REDIS_DB",
            "BASE_PROMPT",
            "TRIGGER_WORDS",
            "CONTEXT_WINDOW_SIZE",
            "USER_CONTEXT_WINDOW_SIZE",
            "TRIM_USER_CONTEXT",
            "LOG_FILE",
        ] {
            env::remove_var(name);
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        env::set_var("TELEGRAM_BOT_TOKEN", "test_token");
        env::set_var("OPENAI_API_KEY", "test_key");

        let settings = Settings::from_env(None).unwrap();

        assert_eq!(settings.telegram.bot_token, "test_token");
        assert!(settings.telegram.bot_username.is_none());
        assert_eq!(settings.ai.model, "gpt-4o-mini");
        assert!(settings.fallback_ai.is_none());
        assert_eq!(settings.redis.host, "localhost");
        assert_eq!(settings.redis.port, 6379);
        assert_eq!(settings.bot.context_window_size, 50);
        assert_eq!(settings.bot.user_context_window_size, 20);
        assert!(settings.bot.trim_user_context);
        assert!(settings.bot.trigger_words.contains(&"bot".to_string()));
        assert!(settings.bot.trigger_words.contains(&"вика".to_string()));
        assert_eq!(settings.log_file, "logs/cbot.log");
    }

    #[test]
    #[serial]
    fn test_missing_bot_token_fails() {
        clear_env();
        env::set_var("OPENAI_API_KEY", "test_key");
        assert!(Settings::from_env(None).is_err());
    }

    #[test]
    #[serial]
    fn test_missing_ai_key_fails() {
        clear_env();
        env::set_var("TELEGRAM_BOT_TOKEN", "test_token");
        assert!(Settings::from_env(None).is_err());
    }

    #[test]
    #[serial]
    fn test_token_override_wins() {
        clear_env();
        env::set_var("TELEGRAM_BOT_TOKEN", "env_token");
        env::set_var("OPENAI_API_KEY", "test_key");

        let settings = Settings::from_env(Some("override_token".to_string())).unwrap();
        assert_eq!(settings.telegram.bot_token, "override_token");
    }

    #[test]
    #[serial]
    fn test_custom_values() {
        clear_env();
        env::set_var("TELEGRAM_BOT_TOKEN", "t");
        env::set_var("AI_API_KEY", "k");
        env::set_var("BOT_USERNAME", "vika_bot");
        env::set_var("TRIGGER_WORDS", " ping , pong ,,");
        env::set_var("CONTEXT_WINDOW_SIZE", "10");
        env::set_var("TRIM_USER_CONTEXT", "false");
        env::set_var("REDIS_PORT", "6380");
        env::set_var("FALLBACK_AI_API_KEY", "fb");

        let settings = Settings::from_env(None).unwrap();
        assert_eq!(settings.telegram.bot_username.as_deref(), Some("vika_bot"));
        assert_eq!(
            settings.bot.trigger_words,
            vec!["ping".to_string(), "pong".to_string()]
        );
        assert_eq!(settings.bot.context_window_size, 10);
        assert!(!settings.bot.trim_user_context);
        assert_eq!(settings.redis.port, 6380);
        assert!(settings.fallback_ai.is_some());

        clear_env();
    }
}
