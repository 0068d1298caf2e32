//! Event handlers for the inbound message stream.

pub mod violations;

use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use tracing::error;

use crate::bot::dispatcher::{AppState, ThrottledBot};
use crate::dialog;

/// Handler for non-command group messages: code enforcement.
pub fn message_event_handler() -> UpdateHandler<anyhow::Error> {
    dptree::filter(|msg: Message| msg.chat.is_group() || msg.chat.is_supergroup())
        .endpoint(group_message_handler)
}

async fn group_message_handler(
    bot: ThrottledBot,
    msg: Message,
    state: AppState,
) -> anyhow::Result<()> {
    if let Err(e) = violations::check_message(&bot, &msg, &state).await {
        error!("violation check error: {}", e);
    }
    Ok(())
}

/// Handler for private-chat text while a configuration session is live.
pub fn dialog_text_handler() -> UpdateHandler<anyhow::Error> {
    dptree::filter(|msg: Message| msg.chat.is_private() && msg.text().is_some())
        .endpoint(private_text_handler)
}

async fn private_text_handler(
    bot: ThrottledBot,
    msg: Message,
    state: AppState,
) -> anyhow::Result<()> {
    dialog::handle_text(&bot, &msg, &state).await?;
    Ok(())
}
