//! /help settings panel and /privacy text.

use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, ParseMode, UserId};

use crate::bot::dispatcher::{AppState, ThrottledBot};
use crate::dialog::CallbackAction;
use crate::store::{GroupSettings, LimitKind};

pub const PRIVACY_POLICY: &str = "🛡️ <b>Privacy Policy – Red Packet Guard</b>\n\n\
Red Packet Guard is a Telegram group moderation bot designed to prevent spam.\n\n\
<b>Information Collection:</b>\n\
We do not store personal data. We temporarily process:\n\
• User ID (for warnings/bans)\n\
• Username (for mentions)\n\
• Message content (for validation)\n\n\
<b>Enforcement:</b>\n\
Settings-based (Defaults: 3 for Timeout, 5 for Ban).\n\n\
<b>Exemptions:</b>\n\
Admins and Owners are exempt from all rules.\n\n\
No data is sold or shared. All processing is automated.";

/// Panel body showing the chat's current thresholds.
pub fn panel_text(settings: &GroupSettings) -> String {
    format!(
        "🛡️ <b>Red Packet Guard – Help Panel</b>\n\n\
         How many spam violations trigger Time Out: <b>{}</b>\n\
         How many spam violations trigger Ban: <b>{}</b>\n\n\
         <b>Actions:</b>\n\
         • <b>Time Out:</b> Restricts user from sending messages.\n\
         • <b>Ban:</b> Removes user from the group.\n\n\
         Only Admins can change these settings. Configuration happens in private chat.",
        settings.timeout_limit, settings.ban_limit
    )
}

pub fn panel_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback(
            "🟡 Time Out Spamming Limit",
            CallbackAction::Configure(LimitKind::Timeout).as_data(),
        ),
        InlineKeyboardButton::callback(
            "🔴 Ban Spamming Limit",
            CallbackAction::Configure(LimitKind::Ban).as_data(),
        ),
    ]])
}

/// Handle /help: the settings panel, admin-gated in groups.
pub async fn help_command(bot: ThrottledBot, msg: Message, state: AppState) -> anyhow::Result<()> {
    let chat_id = msg.chat.id;

    if !msg.chat.is_private() {
        let user_id = msg.from.as_ref().map(|u| u.id).unwrap_or(UserId(0));
        if !state.permissions.is_admin(chat_id, user_id).await.unwrap_or(false) {
            bot.send_message(chat_id, "You do not have permission to change group settings.")
                .await?;
            return Ok(());
        }
    }

    let settings = state.settings.get(chat_id.0);
    bot.send_message(chat_id, panel_text(&settings))
        .parse_mode(ParseMode::Html)
        .reply_markup(panel_keyboard())
        .await?;

    Ok(())
}

/// Handle /privacy.
pub async fn privacy_command(
    bot: ThrottledBot,
    msg: Message,
    _state: AppState,
) -> anyhow::Result<()> {
    bot.send_message(msg.chat.id, PRIVACY_POLICY)
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}
