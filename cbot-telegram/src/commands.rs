//! Command surface: the three fixed verbs.

use teloxide::utils::command::BotCommands;

/// Bot commands, each answered from the store and configuration.
#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "Supported commands:")]
pub enum Command {
    #[command(description = "greeting and capabilities.")]
    Start,
    #[command(description = "clear the chat context.")]
    Clear,
    #[command(description = "show context status.")]
    Status,
}
