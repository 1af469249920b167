//! Core types: the chat message record shared by storage, prompt assembly and the router.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reserved sequence id for messages synthesized locally (bot replies) before
/// the transport has confirmed delivery and assigned a real id.
pub const SEQUENCE_ID_UNASSIGNED: i64 = 0;

/// A single chat message as stored in the rolling context.
///
/// `display_name` is `None` for accounts without a public name. `created_at`
/// serializes as RFC 3339. Read order is governed by insertion order, not by
/// this timestamp; two messages stored in the same millisecond keep their
/// insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub author_id: i64,
    pub display_name: Option<String>,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub message_sequence_id: i64,
}

impl ChatMessage {
    /// Creates a record stamped with the current time.
    pub fn new(
        author_id: i64,
        display_name: Option<String>,
        body: impl Into<String>,
        message_sequence_id: i64,
    ) -> Self {
        Self {
            author_id,
            display_name,
            body: body.into(),
            created_at: Utc::now(),
            message_sequence_id,
        }
    }

    /// Display name to show for this message, or `user_{id}` when absent.
    pub fn display_name_or_id(&self) -> String {
        self.display_name
            .clone()
            .unwrap_or_else(|| format!("user_{}", self.author_id))
    }
}
