//! Retry and failover orchestration over [`CompletionClient`] backends.
//!
//! One primary backend, one optional secondary. With a secondary configured,
//! the primary gets a bounded retry budget, then the secondary gets its own;
//! without one, the primary is tried once and its failure is surfaced
//! directly. Whatever happens, [`CompletionService::generate`] returns a
//! deliverable payload: exhausted budgets produce a user-safe error message
//! carrying the last failure, never an `Err`.

use std::sync::Arc;
use std::time::Duration;

use prompt::PromptMessage;
use tracing::{info, warn};

use crate::{Completion, CompletionClient};

/// Fixed reply when a backend succeeds but returns empty content.
pub const EMPTY_REPLY_FALLBACK: &str = "Sorry, I cannot come up with an answer.";

/// Prefix of the user-safe payload produced when every backend fails.
pub const FAILURE_REPLY_PREFIX: &str = "Something went wrong while handling the request";

/// Deterministic retry budget: `max_attempts` tries per backend with a
/// doubling delay between them.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Budget with no delay between attempts; tests use this so retries are
    /// observable without sleeping.
    pub const fn no_backoff(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
        }
    }

    /// Delay before the attempt after `attempt` (1-based): base, 2×base, 4×base…
    fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt.saturating_sub(1))
    }
}

/// The reply payload handed back to the router. Always deliverable; on total
/// failure `content` is the user-safe error text and `model_used` is `None`.
#[derive(Debug, Clone)]
pub struct AiResponse {
    pub content: String,
    pub tokens_used: Option<u32>,
    pub model_used: Option<String>,
}

/// Orchestrates completion across a primary and an optional secondary backend.
pub struct CompletionService {
    primary: Arc<dyn CompletionClient>,
    fallback: Option<Arc<dyn CompletionClient>>,
    retry: RetryPolicy,
}

impl CompletionService {
    pub fn new(
        primary: Arc<dyn CompletionClient>,
        fallback: Option<Arc<dyn CompletionClient>>,
    ) -> Self {
        Self {
            primary,
            fallback,
            retry: RetryPolicy::default(),
        }
    }

    /// Overrides the retry budget (tests inject a zero-delay policy).
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Produces a reply for the given turns. Never fails: the worst case is a
    /// payload whose content describes the last underlying failure.
    pub async fn generate(&self, messages: Vec<PromptMessage>) -> AiResponse {
        let Some(fallback) = &self.fallback else {
            // No secondary: a single attempt, surfaced directly on failure.
            return match self.primary.complete(messages).await {
                Ok(completion) => Self::success(completion, self.primary.model()),
                Err(e) => {
                    warn!(backend = "primary", error = %e, "Completion failed, no fallback configured");
                    Self::failure(&e)
                }
            };
        };

        match self.complete_with_retries(self.primary.as_ref(), &messages, "primary").await {
            Ok(completion) => return Self::success(completion, self.primary.model()),
            Err(e) => {
                warn!(
                    backend = "primary",
                    error = %e,
                    "Primary backend exhausted its retry budget, switching to fallback"
                );
            }
        }

        match self.complete_with_retries(fallback.as_ref(), &messages, "fallback").await {
            Ok(completion) => {
                info!(model = %fallback.model(), "Fallback backend answered");
                Self::success(completion, fallback.model())
            }
            Err(e) => {
                warn!(backend = "fallback", error = %e, "Fallback backend exhausted its retry budget");
                Self::failure(&e)
            }
        }
    }

    /// Tries one backend up to the budget, logging each failed attempt.
    async fn complete_with_retries(
        &self,
        client: &dyn CompletionClient,
        messages: &[PromptMessage],
        backend: &'static str,
    ) -> anyhow::Result<Completion> {
        let mut last_error = anyhow::anyhow!("no completion attempts were made");
        for attempt in 1..=self.retry.max_attempts {
            match client.complete(messages.to_vec()).await {
                Ok(completion) => return Ok(completion),
                Err(e) => {
                    warn!(
                        backend,
                        attempt,
                        max_attempts = self.retry.max_attempts,
                        error = %e,
                        "Completion attempt failed"
                    );
                    last_error = e;
                    if attempt < self.retry.max_attempts {
                        tokio::time::sleep(self.retry.delay_after(attempt)).await;
                    }
                }
            }
        }
        Err(last_error)
    }

    fn success(completion: Completion, model: &str) -> AiResponse {
        let content = if completion.content.is_empty() {
            EMPTY_REPLY_FALLBACK.to_string()
        } else {
            completion.content
        };
        AiResponse {
            content,
            tokens_used: completion.total_tokens,
            model_used: Some(model.to_string()),
        }
    }

    fn failure(error: &anyhow::Error) -> AiResponse {
        AiResponse {
            content: format!("{}: {}", FAILURE_REPLY_PREFIX, error),
            tokens_used: None,
            model_used: None,
        }
    }
}
