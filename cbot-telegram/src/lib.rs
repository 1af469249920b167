//! Telegram transport layer: teloxide adapters, the relay pipeline handler,
//! the command surface, env configuration, and the dispatcher runner.

mod adapters;
mod commands;
mod config;
mod handler;
mod runner;
mod transport;

pub use adapters::TelegramMessageWrapper;
pub use commands::Command;
pub use config::{BotProfile, Settings, TelegramConfig};
pub use handler::{BotIdentity, RelayHandler};
pub use runner::run_bot;
pub use transport::TelegramTransport;
