//! Dual-scope rolling history over a [`ListBackend`].
//!
//! Two disjoint key namespaces: `chat_context:{chat_id}` for whole-chat
//! history and `user_context:{chat_id}:{user_id}` for one participant's
//! history within a chat. Records are stored newest-first (backend head) and
//! read back in chronological order. Every append refreshes a 24-hour key
//! expiry; when it elapses the backend drops the whole scope at once.

use std::sync::Arc;
use std::time::Duration;

use cbot_core::ChatMessage;
use tracing::{debug, info};

use crate::backend::ListBackend;
use crate::error::StoreError;

/// Key namespace for whole-chat history.
pub const CHAT_KEY_PREFIX: &str = "chat_context";

/// Key namespace for per-participant history within a chat.
pub const USER_KEY_PREFIX: &str = "user_context";

/// Retention window: a scope disappears this long after its last append.
const RETENTION: Duration = Duration::from_secs(24 * 60 * 60);

/// Rolling chat and participant history on top of a list backend.
///
/// The store owns both namespaces; no other component touches the backend
/// keys directly. Insertion order is the backend's list order, so two
/// messages appended in the same millisecond keep their append order on read.
#[derive(Clone)]
pub struct ContextStore {
    backend: Arc<dyn ListBackend>,
}

impl ContextStore {
    pub fn new(backend: Arc<dyn ListBackend>) -> Self {
        Self { backend }
    }

    fn chat_key(chat_id: i64) -> String {
        format!("{}:{}", CHAT_KEY_PREFIX, chat_id)
    }

    fn user_key(chat_id: i64, user_id: i64) -> String {
        format!("{}:{}:{}", USER_KEY_PREFIX, chat_id, user_id)
    }

    async fn append(&self, key: &str, message: &ChatMessage) -> Result<(), StoreError> {
        let record = serde_json::to_string(message)
            .map_err(|e| StoreError::MalformedRecord(e.to_string()))?;
        self.backend.push_front(key, record).await?;
        self.backend.set_expiry(key, RETENTION).await?;
        Ok(())
    }

    /// Reads up to `limit` most recent records at `key` in chronological
    /// order (oldest first). Records that fail to parse are skipped so
    /// partial corruption never aborts a read.
    async fn read(&self, key: &str, limit: usize) -> Result<Vec<ChatMessage>, StoreError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let raw = self.backend.range(key, 0, limit as isize - 1).await?;
        let mut messages: Vec<ChatMessage> = raw
            .iter()
            .filter_map(|record| match serde_json::from_str(record) {
                Ok(message) => Some(message),
                Err(e) => {
                    debug!(key = %key, error = %e, "Skipping malformed context record");
                    None
                }
            })
            .collect();
        messages.reverse();
        Ok(messages)
    }

    /// Appends a message to the chat scope and refreshes its expiry.
    pub async fn add_message(&self, chat_id: i64, message: &ChatMessage) -> Result<(), StoreError> {
        self.append(&Self::chat_key(chat_id), message).await
    }

    /// Appends a message to one participant's scope and refreshes its expiry.
    pub async fn add_user_message(
        &self,
        chat_id: i64,
        user_id: i64,
        message: &ChatMessage,
    ) -> Result<(), StoreError> {
        self.append(&Self::user_key(chat_id, user_id), message).await
    }

    /// Up to `limit` most recent chat messages, oldest first.
    pub async fn chat_history(
        &self,
        chat_id: i64,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, StoreError> {
        self.read(&Self::chat_key(chat_id), limit).await
    }

    /// Up to `limit` most recent messages of one participant, oldest first.
    pub async fn user_history(
        &self,
        chat_id: i64,
        user_id: i64,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, StoreError> {
        self.read(&Self::user_key(chat_id, user_id), limit).await
    }

    /// Retains only the `max_size` most recently appended chat messages.
    pub async fn trim_chat(&self, chat_id: i64, max_size: usize) -> Result<(), StoreError> {
        self.backend.trim(&Self::chat_key(chat_id), max_size).await
    }

    /// Retains only the `max_size` most recently appended messages of one
    /// participant.
    pub async fn trim_user(
        &self,
        chat_id: i64,
        user_id: i64,
        max_size: usize,
    ) -> Result<(), StoreError> {
        self.backend
            .trim(&Self::user_key(chat_id, user_id), max_size)
            .await
    }

    /// Deletes the whole chat scope. Idempotent.
    pub async fn clear_chat(&self, chat_id: i64) -> Result<(), StoreError> {
        info!(chat_id, "Clearing chat context");
        self.backend.remove(&Self::chat_key(chat_id)).await
    }

    /// Current chat-scope message count.
    pub async fn chat_len(&self, chat_id: i64) -> Result<usize, StoreError> {
        self.backend.len(&Self::chat_key(chat_id)).await
    }

    /// Every user with a live participant scope in this chat. Keys that do
    /// not parse as `user_context:{chat}:{user}` are skipped.
    pub async fn participants(&self, chat_id: i64) -> Result<Vec<i64>, StoreError> {
        let prefix = format!("{}:{}:", USER_KEY_PREFIX, chat_id);
        let keys = self.backend.scan_prefix(&prefix).await?;
        let mut user_ids = Vec::new();
        for key in keys {
            let mut parts = key.split(':');
            let (Some(_), Some(_), Some(user), None) =
                (parts.next(), parts.next(), parts.next(), parts.next())
            else {
                continue;
            };
            match user.parse::<i64>() {
                Ok(id) => user_ids.push(id),
                Err(_) => {
                    debug!(key = %key, "Skipping malformed participant key");
                }
            }
        }
        Ok(user_ids)
    }
}
