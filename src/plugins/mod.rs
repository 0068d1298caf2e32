//! Command handlers.

pub mod help;
pub mod start;

use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use crate::bot::dispatcher::{AppState, ThrottledBot};
use crate::dialog::{self, CallbackAction};

/// All bot commands.
#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "Start the bot")]
    Start(String),

    #[command(description = "Settings panel")]
    Help,

    #[command(description = "Privacy policy")]
    Privacy,
}

/// Build the combined command handler.
pub fn command_handler() -> UpdateHandler<anyhow::Error> {
    use dptree::case;

    teloxide::filter_command::<Command, _>()
        .branch(case![Command::Start(payload)].endpoint(handle_start))
        .branch(case![Command::Help].endpoint(help::help_command))
        .branch(case![Command::Privacy].endpoint(help::privacy_command))
}

/// Build the callback query handler.
///
/// Callback data is decoded into [`CallbackAction`] right here; presses with
/// unknown data are dropped on the floor.
pub fn callback_handler() -> UpdateHandler<anyhow::Error> {
    Update::filter_callback_query()
        .filter_map(|q: CallbackQuery| q.data.as_deref().and_then(CallbackAction::parse))
        .endpoint(handle_callback)
}

async fn handle_start(
    bot: ThrottledBot,
    msg: Message,
    state: AppState,
    payload: String,
) -> anyhow::Result<()> {
    start::start_handler(bot, msg, state, payload).await
}

async fn handle_callback(
    bot: ThrottledBot,
    q: CallbackQuery,
    state: AppState,
    action: CallbackAction,
) -> anyhow::Result<()> {
    dialog::handle_callback(bot, q, state, action).await
}
