//! Backend abstraction: ordered lists on string keys.
//!
//! The contract mirrors redis list primitives (LPUSH/LRANGE/LTRIM/DEL/LLEN/
//! EXPIRE/SCAN) so the store protocol is identical across backends. Single-key
//! operations are atomic at the backend level; cross-key consistency is not
//! required.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::StoreError;

/// Ordered-list storage on string keys. Index 0 is the most recently pushed
/// element.
#[async_trait]
pub trait ListBackend: Send + Sync {
    /// Inserts `value` at the head of the list at `key`, creating the key if
    /// absent.
    async fn push_front(&self, key: &str, value: String) -> Result<(), StoreError>;

    /// Returns elements from index `start` through `stop` inclusive, head
    /// first. Negative `stop` counts from the tail (`-1` is the last
    /// element). Missing keys read as empty.
    async fn range(&self, key: &str, start: isize, stop: isize) -> Result<Vec<String>, StoreError>;

    /// Retains only the `max_len` elements closest to the head; discards the
    /// rest. `max_len` of zero removes the key.
    async fn trim(&self, key: &str, max_len: usize) -> Result<(), StoreError>;

    /// Deletes the key and its list. Deleting a missing key is a no-op.
    async fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Number of elements at `key`; zero for missing keys.
    async fn len(&self, key: &str) -> Result<usize, StoreError>;

    /// Sets (or refreshes) the key's time-to-live. When it elapses the whole
    /// key disappears.
    async fn set_expiry(&self, key: &str, ttl: Duration) -> Result<(), StoreError>;

    /// Returns all live keys starting with `prefix`. Best-effort under
    /// backend key churn; order is unspecified.
    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError>;
}
