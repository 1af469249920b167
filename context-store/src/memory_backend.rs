//! In-memory implementation of [`ListBackend`] for tests and development.
//!
//! Mirrors the redis list semantics including key expiry; expired keys are
//! purged lazily on access.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::backend::ListBackend;
use crate::error::StoreError;

#[derive(Debug, Clone)]
struct StoredList {
    /// Head-first: index 0 is the most recently pushed element.
    items: Vec<String>,
    expires_at: Option<Instant>,
}

impl StoredList {
    fn expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Instant::now() >= at)
    }
}

type ListMap = HashMap<String, StoredList>;

/// In-memory list store with redis-like semantics.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    lists: Arc<RwLock<ListMap>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops the key when its TTL has elapsed, so reads never observe it.
    fn purge_expired(lists: &mut ListMap, key: &str) {
        if lists.get(key).is_some_and(StoredList::expired) {
            lists.remove(key);
        }
    }
}

/// Resolves a redis-style inclusive range against a list of `len` elements.
/// Negative `stop` counts from the tail; out-of-range indices are clamped.
fn resolve_range(len: usize, start: isize, stop: isize) -> Option<(usize, usize)> {
    let len = len as isize;
    let start = if start < 0 { len + start } else { start }.max(0);
    let stop = if stop < 0 { len + stop } else { stop }.min(len - 1);
    if start > stop || start >= len {
        return None;
    }
    Some((start as usize, stop as usize))
}

#[async_trait]
impl ListBackend for MemoryBackend {
    async fn push_front(&self, key: &str, value: String) -> Result<(), StoreError> {
        let mut lists = self.lists.write().await;
        Self::purge_expired(&mut lists, key);
        let list = lists.entry(key.to_string()).or_insert_with(|| StoredList {
            items: Vec::new(),
            expires_at: None,
        });
        list.items.insert(0, value);
        Ok(())
    }

    async fn range(&self, key: &str, start: isize, stop: isize) -> Result<Vec<String>, StoreError> {
        let mut lists = self.lists.write().await;
        Self::purge_expired(&mut lists, key);
        let Some(list) = lists.get(key) else {
            return Ok(Vec::new());
        };
        let Some((start, stop)) = resolve_range(list.items.len(), start, stop) else {
            return Ok(Vec::new());
        };
        Ok(list.items[start..=stop].to_vec())
    }

    async fn trim(&self, key: &str, max_len: usize) -> Result<(), StoreError> {
        let mut lists = self.lists.write().await;
        Self::purge_expired(&mut lists, key);
        if max_len == 0 {
            lists.remove(key);
            return Ok(());
        }
        if let Some(list) = lists.get_mut(key) {
            list.items.truncate(max_len);
        }
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.lists.write().await.remove(key);
        Ok(())
    }

    async fn len(&self, key: &str) -> Result<usize, StoreError> {
        let mut lists = self.lists.write().await;
        Self::purge_expired(&mut lists, key);
        Ok(lists.get(key).map_or(0, |l| l.items.len()))
    }

    async fn set_expiry(&self, key: &str, ttl: Duration) -> Result<(), StoreError> {
        let mut lists = self.lists.write().await;
        if let Some(list) = lists.get_mut(key) {
            list.expires_at = Some(Instant::now() + ttl);
        }
        Ok(())
    }

    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let mut lists = self.lists.write().await;
        let expired: Vec<String> = lists
            .iter()
            .filter(|(_, l)| l.expired())
            .map(|(k, _)| k.clone())
            .collect();
        for key in expired {
            lists.remove(&key);
        }
        Ok(lists
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_range() {
        assert_eq!(resolve_range(5, 0, -1), Some((0, 4)));
        assert_eq!(resolve_range(5, 0, 2), Some((0, 2)));
        assert_eq!(resolve_range(5, 0, 9), Some((0, 4)));
        assert_eq!(resolve_range(3, 4, 9), None);
        assert_eq!(resolve_range(0, 0, -1), None);
    }

    #[tokio::test]
    async fn test_push_front_orders_head_first() {
        let backend = MemoryBackend::new();
        backend.push_front("k", "a".into()).await.unwrap();
        backend.push_front("k", "b".into()).await.unwrap();
        let items = backend.range("k", 0, -1).await.unwrap();
        assert_eq!(items, vec!["b".to_string(), "a".to_string()]);
    }

    #[tokio::test]
    async fn test_expiry_removes_key() {
        let backend = MemoryBackend::new();
        backend.push_front("k", "a".into()).await.unwrap();
        backend
            .set_expiry("k", Duration::from_millis(10))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(backend.len("k").await.unwrap(), 0);
        assert!(backend.scan_prefix("k").await.unwrap().is_empty());
    }
}
