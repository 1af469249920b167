//! Dispatcher runner: builds the store, completion clients and relay handler
//! from [`Settings`], resolves the bot identity via `get_me`, and runs the
//! teloxide dispatcher until shutdown.

use std::sync::Arc;

use anyhow::{Context, Result};
use cbot_core::Transport;
use context_store::{ContextStore, RedisBackend};
use llm_client::{CompletionClient, CompletionService, OpenAiCompletion};
use teloxide::prelude::*;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::adapters::TelegramMessageWrapper;
use crate::commands::Command;
use crate::config::Settings;
use crate::handler::{BotIdentity, RelayHandler};
use crate::transport::TelegramTransport;

/// Builds the relay handler from settings and a connected store backend.
async fn build_relay(settings: &Settings, bot: Bot) -> Result<Arc<RelayHandler>> {
    let backend = RedisBackend::connect(&settings.redis)
        .await
        .context("Connect to redis (REDIS_HOST / REDIS_PORT / REDIS_PASSWORD)")?;
    let store = ContextStore::new(Arc::new(backend));

    let primary: Arc<dyn CompletionClient> = Arc::new(OpenAiCompletion::from_config(&settings.ai));
    let fallback: Option<Arc<dyn CompletionClient>> = settings
        .fallback_ai
        .as_ref()
        .map(|config| Arc::new(OpenAiCompletion::from_config(config)) as Arc<dyn CompletionClient>);
    if fallback.is_some() {
        info!(
            fallback_model = %settings.fallback_ai.as_ref().map(|c| c.model.as_str()).unwrap_or_default(),
            "Fallback completion backend configured"
        );
    }
    let completion = Arc::new(CompletionService::new(primary, fallback));

    let transport: Arc<dyn Transport> = Arc::new(TelegramTransport::new(bot.clone()));

    let identity = Arc::new(RwLock::new(BotIdentity {
        id: 0,
        username: settings.telegram.bot_username.clone(),
    }));
    match bot.get_me().await {
        Ok(me) => {
            let mut identity = identity.write().await;
            identity.id = me.user.id.0 as i64;
            if let Some(username) = &me.user.username {
                identity.username = Some(username.clone());
            }
            info!(bot_id = identity.id, username = ?identity.username, "Bot identity resolved");
        }
        Err(e) => {
            warn!(error = %e, "get_me failed, using configured BOT_USERNAME");
        }
    }

    let model_label = format!("{} ({})", settings.ai.model, settings.ai.provider);
    Ok(Arc::new(RelayHandler::new(
        store,
        completion,
        transport,
        identity,
        settings.bot.clone(),
        model_label,
    )))
}

async fn on_command(
    bot: Bot,
    msg: Message,
    command: Command,
    relay: Arc<RelayHandler>,
) -> ResponseResult<()> {
    let chat_id = msg.chat.id;
    let text = match command {
        Command::Start => relay.start_text(),
        Command::Clear => relay.clear_text(chat_id.0).await,
        Command::Status => relay.status_text(chat_id.0).await,
    };
    bot.send_message(chat_id, text).await?;
    Ok(())
}

async fn on_message(msg: Message, relay: Arc<RelayHandler>) -> ResponseResult<()> {
    let Some(message) = TelegramMessageWrapper(&msg).to_chat_message() else {
        return Ok(());
    };
    let chat_id = msg.chat.id.0;
    info!(
        user_id = message.author_id,
        chat_id,
        message_content = %message.body,
        "Received message"
    );

    // One conversation must never block another: run the pipeline in its own
    // task and return the update slot immediately.
    tokio::spawn(async move {
        if let Err(e) = relay.handle_message(chat_id, message).await {
            error!(error = %e, chat_id, "Relay pipeline failed");
        }
    });
    Ok(())
}

/// Starts the bot: connects the store, resolves identity, and dispatches
/// updates until shutdown.
pub async fn run_bot(settings: Settings) -> Result<()> {
    let bot = Bot::new(settings.telegram.bot_token.clone());
    let relay = build_relay(&settings, bot.clone()).await?;

    info!(
        model = %settings.ai.model,
        provider = %settings.ai.provider,
        context_window = settings.bot.context_window_size,
        "Bot started successfully and polling for updates"
    );

    let handler = Update::filter_message()
        .branch(
            dptree::entry()
                .filter_command::<Command>()
                .endpoint(on_command),
        )
        .branch(dptree::endpoint(on_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![relay])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
