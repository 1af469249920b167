//! cbot CLI: run the chat-context relay bot. Config from env (.env supported)
//! and optional CLI args.

use anyhow::{Context, Result};
use cbot_telegram::{run_bot, Settings};
use clap::{Parser, Subcommand};
use tracing::info;

#[derive(Parser)]
#[command(name = "cbot")]
#[command(about = "Chat-context relay bot for Telegram", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the bot (config from env; token can override TELEGRAM_BOT_TOKEN).
    Run {
        #[arg(short, long)]
        token: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { token } => {
            // Configuration errors are the only fatal ones; everything after
            // startup degrades instead of exiting.
            let settings = Settings::from_env(token)
                .context("Load settings from environment (see .env.example)")?;

            std::fs::create_dir_all("logs").context("Create logs directory")?;
            cbot_core::init_tracing(&settings.log_file)?;

            info!(
                model = %settings.ai.model,
                provider = %settings.ai.provider,
                fallback_configured = settings.fallback_ai.is_some(),
                context_window = settings.bot.context_window_size,
                "Starting cbot"
            );

            run_bot(settings).await
        }
    }
}
