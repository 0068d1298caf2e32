//! /start command plugin.
//!
//! Handles the greeting and the configuration deep links
//! (`?start=config_<action>_<chat_id>` and `?start=config`).

use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, ParseMode};

use crate::bot::dispatcher::{AppState, ThrottledBot};
use crate::dialog;
use crate::store::LimitKind;

/// Handle /start with an optional deep-link payload.
pub async fn start_handler(
    bot: ThrottledBot,
    msg: Message,
    state: AppState,
    payload: String,
) -> anyhow::Result<()> {
    let chat_id = msg.chat.id;

    if msg.chat.is_private() {
        if let Some(user) = msg.from.as_ref() {
            if let Some((kind, group_id)) = parse_config_payload(&payload) {
                return dialog::start_prebound(&bot, &state, chat_id, user.id, kind, group_id)
                    .await;
            }
            if payload == "config" && dialog::resume(&bot, &state, chat_id, user.id).await? {
                return Ok(());
            }
        }
    }

    let add_url = format!(
        "https://t.me/{}?startgroup=true&admin=delete_messages+restrict_members",
        state.bot_username
    )
    .parse()
    .expect("startgroup url");

    let keyboard = InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::url("➕ Add me to your chat", add_url)],
        vec![InlineKeyboardButton::callback(
            "🛡️ Privacy Policy",
            dialog::CallbackAction::Privacy.as_data(),
        )],
    ]);

    bot.send_message(
        chat_id,
        "🛡️ <b>Hey there! My name is Red Packet Guard</b> - I'm here to help you manage your \
         groups! Use /help to find out how to use me to my full potential.\n\n\
         🛡️ <b>Check /privacy</b> to view the privacy policy.",
    )
    .parse_mode(ParseMode::Html)
    .reply_markup(keyboard)
    .await?;

    Ok(())
}

/// Parse `config_<timeout|ban>_<chat_id>` deep-link payloads.
fn parse_config_payload(payload: &str) -> Option<(LimitKind, i64)> {
    let rest = payload.strip_prefix("config_")?;
    let (kind, group) = rest.split_once('_')?;
    let kind = match kind {
        "timeout" => LimitKind::Timeout,
        "ban" => LimitKind::Ban,
        _ => return None,
    };
    Some((kind, group.parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config_payload() {
        assert_eq!(
            parse_config_payload("config_timeout_-1001234"),
            Some((LimitKind::Timeout, -1001234))
        );
        assert_eq!(
            parse_config_payload("config_ban_42"),
            Some((LimitKind::Ban, 42))
        );
        assert_eq!(parse_config_payload("config"), None);
        assert_eq!(parse_config_payload("config_kick_42"), None);
        assert_eq!(parse_config_payload("config_ban_abc"), None);
    }
}
