//! Redis implementation of [`ListBackend`].
//!
//! Uses a multiplexed connection manager that reconnects on its own; every
//! redis error is mapped to [`StoreError::Unavailable`] so callers see one
//! backend-outage kind.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::info;

use crate::backend::ListBackend;
use crate::config::RedisConfig;
use crate::error::StoreError;

/// [`ListBackend`] over redis lists.
#[derive(Clone)]
pub struct RedisBackend {
    manager: ConnectionManager,
}

impl RedisBackend {
    /// Connects to redis with the given configuration.
    pub async fn connect(config: &RedisConfig) -> Result<Self, StoreError> {
        let client = redis::Client::open(config.url()).map_err(unavailable)?;
        let manager = ConnectionManager::new(client).await.map_err(unavailable)?;
        info!(host = %config.host, port = config.port, db = config.db, "Connected to redis");
        Ok(Self { manager })
    }
}

fn unavailable(e: redis::RedisError) -> StoreError {
    StoreError::Unavailable(e.to_string())
}

#[async_trait]
impl ListBackend for RedisBackend {
    async fn push_front(&self, key: &str, value: String) -> Result<(), StoreError> {
        let mut conn = self.manager.clone();
        let _: () = conn.lpush(key, value).await.map_err(unavailable)?;
        Ok(())
    }

    async fn range(&self, key: &str, start: isize, stop: isize) -> Result<Vec<String>, StoreError> {
        let mut conn = self.manager.clone();
        conn.lrange(key, start, stop).await.map_err(unavailable)
    }

    async fn trim(&self, key: &str, max_len: usize) -> Result<(), StoreError> {
        let mut conn = self.manager.clone();
        if max_len == 0 {
            // LTRIM 0 -1 would keep everything; an empty window means no key.
            let _: () = conn.del(key).await.map_err(unavailable)?;
            return Ok(());
        }
        let _: () = conn
            .ltrim(key, 0, max_len as isize - 1)
            .await
            .map_err(unavailable)?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut conn = self.manager.clone();
        let _: () = conn.del(key).await.map_err(unavailable)?;
        Ok(())
    }

    async fn len(&self, key: &str) -> Result<usize, StoreError> {
        let mut conn = self.manager.clone();
        conn.llen(key).await.map_err(unavailable)
    }

    async fn set_expiry(&self, key: &str, ttl: Duration) -> Result<(), StoreError> {
        let mut conn = self.manager.clone();
        let _: () = conn
            .expire(key, ttl.as_secs() as i64)
            .await
            .map_err(unavailable)?;
        Ok(())
    }

    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let mut conn = self.manager.clone();
        let pattern = format!("{}*", prefix);
        let mut keys = Vec::new();
        let mut iter: redis::AsyncIter<'_, String> =
            conn.scan_match(pattern).await.map_err(unavailable)?;
        while let Some(key) = iter.next_item().await {
            keys.push(key);
        }
        Ok(keys)
    }
}
