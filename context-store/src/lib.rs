//! Context store crate: the rolling, dual-scope chat history.
//!
//! ## Modules
//!
//! - [`error`] – Store error kinds
//! - [`backend`] – ListBackend trait (ordered lists on string keys)
//! - [`redis_backend`] – RedisBackend (redis lists, connection manager)
//! - [`memory_backend`] – MemoryBackend (in-process, tests and development)
//! - [`config`] – RedisConfig
//! - [`store`] – ContextStore (per-chat and per-user history protocol)

mod backend;
mod config;
mod error;
mod memory_backend;
mod redis_backend;
mod store;

pub use backend::ListBackend;
pub use config::RedisConfig;
pub use error::StoreError;
pub use memory_backend::MemoryBackend;
pub use redis_backend::RedisBackend;
pub use store::{ContextStore, CHAT_KEY_PREFIX, USER_KEY_PREFIX};
