//! Red packet code enforcement.
//!
//! Every group message that isn't a valid code gets deleted, counted, and
//! escalated per the group's settings.

use std::time::Duration;

use chrono::Utc;
use teloxide::prelude::*;
use teloxide::types::{ChatId, ChatPermissions, MessageId, ParseMode};
use tracing::{debug, info, warn};

use crate::bot::dispatcher::{AppState, ThrottledBot};
use crate::moderation::{is_valid_code, Enforcement};
use crate::store::GroupSettings;
use crate::utils::{display_name, format_duration, html_escape};

/// How long transient notices stay up before best-effort deletion.
const NOTICE_TTL: Duration = Duration::from_secs(10);

/// Whether a message should be deleted and counted against its sender.
///
/// Admins and group owners are always exempt, and nothing is enforced while
/// spam control is switched off for the group. Media and stickers carry no
/// text and therefore never pass as codes.
fn should_enforce(is_admin: bool, settings: &GroupSettings, text: Option<&str>) -> bool {
    if is_admin || !settings.spam_control_enabled {
        return false;
    }
    !text.map(is_valid_code).unwrap_or(false)
}

/// Check a group message against the code format and enforce.
pub async fn check_message(
    bot: &ThrottledBot,
    msg: &Message,
    state: &AppState,
) -> anyhow::Result<()> {
    let chat_id = msg.chat.id;
    let user = match msg.from.as_ref() {
        Some(u) => u,
        None => return Ok(()),
    };
    if user.is_bot {
        return Ok(());
    }

    // Keep the group picker in the mini-app populated.
    if let Some(title) = msg.chat.title() {
        state.settings.record_title(chat_id.0, title);
    }

    // An undeterminable admin status reads as "not admin" and gets
    // moderated.
    let is_admin = state
        .permissions
        .is_admin(chat_id, user.id)
        .await
        .unwrap_or(false);

    let settings = state.settings.get(chat_id.0);
    if !should_enforce(is_admin, &settings, msg.text()) {
        return Ok(());
    }

    // The counter increments whether or not the delete goes through.
    if let Err(e) = bot.delete_message(chat_id, msg.id).await {
        warn!("failed to delete message {} in chat {}: {}", msg.id.0, chat_id, e);
    }

    let enforcement = state
        .violations
        .record_violation(chat_id.0, user.id.0, &settings);
    let name = html_escape(&display_name(user));

    debug!(
        "violation by {} in chat {} -> {:?}",
        user.id, chat_id, enforcement
    );

    match enforcement {
        Enforcement::Warning => {
            send_notice(
                bot,
                chat_id,
                format!(
                    "⚠️ Warning {}!\n\nDon't Spam Anything Else Only Send Red Packet Codes.",
                    name
                ),
            )
            .await;
        }

        Enforcement::Timeout { secs } => {
            let until = Utc::now() + chrono::Duration::seconds(secs as i64);
            match bot
                .restrict_chat_member(chat_id, user.id, ChatPermissions::empty())
                .until_date(until)
                .await
            {
                Ok(_) => {
                    info!("timed out user {} in chat {} for {}s", user.id, chat_id, secs);
                    if settings.timeout_notify {
                        send_notice(
                            bot,
                            chat_id,
                            format!(
                                "⏳ Warning {}!\n\nYou have been timed out for {} due to spamming.\n\n\
                                 Don't Spam Anything Else Only Send Red Packet Codes.",
                                name,
                                format_duration(secs)
                            ),
                        )
                        .await;
                    }
                }
                Err(e) => warn!("failed to restrict user {} in chat {}: {}", user.id, chat_id, e),
            }
        }

        Enforcement::Ban { secs } => {
            let request = bot.ban_chat_member(chat_id, user.id);
            let result = if secs == 0 {
                request.await
            } else {
                request
                    .until_date(Utc::now() + chrono::Duration::seconds(secs as i64))
                    .await
            };
            match result {
                Ok(_) => {
                    info!("banned user {} in chat {} ({}s)", user.id, chat_id, secs);
                    if settings.ban_notify {
                        send_notice(
                            bot,
                            chat_id,
                            format!(
                                "🚫 {} has been banned for excessive spamming ({}+ violations).",
                                name, settings.ban_limit
                            ),
                        )
                        .await;
                    }
                }
                Err(e) => warn!("failed to ban user {} in chat {}: {}", user.id, chat_id, e),
            }
        }
    }

    Ok(())
}

/// Send a transient notice and schedule its deletion.
///
/// The cleanup is a detached timer; if the chat or message is gone by then
/// the delete fails silently and that is fine. Send failures are logged and
/// dropped here rather than aborting the handler.
async fn send_notice(bot: &ThrottledBot, chat_id: ChatId, text: String) {
    let sent = match bot
        .send_message(chat_id, text)
        .parse_mode(ParseMode::Html)
        .await
    {
        Ok(m) => m,
        Err(e) => {
            warn!("failed to send notice in chat {}: {}", chat_id, e);
            return;
        }
    };

    schedule_delete(bot.clone(), chat_id, sent.id);
}

fn schedule_delete(bot: ThrottledBot, chat_id: ChatId, message_id: MessageId) {
    tokio::spawn(async move {
        tokio::time::sleep(NOTICE_TTL).await;
        let _ = bot.delete_message(chat_id, message_id).await;
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admins_are_exempt() {
        let settings = GroupSettings::default();
        assert!(!should_enforce(true, &settings, Some("this is spam")));
        assert!(!should_enforce(true, &settings, None));
    }

    #[test]
    fn test_disabled_spam_control_skips_everyone() {
        let settings = GroupSettings {
            spam_control_enabled: false,
            ..GroupSettings::default()
        };
        assert!(!should_enforce(false, &settings, Some("not a code at all")));
    }

    #[test]
    fn test_non_admin_violations_are_enforced() {
        let settings = GroupSettings::default();
        assert!(should_enforce(false, &settings, Some("hello everyone")));
        // Media and stickers have no text.
        assert!(should_enforce(false, &settings, None));
    }

    #[test]
    fn test_valid_codes_pass() {
        let settings = GroupSettings::default();
        assert!(!should_enforce(false, &settings, Some("Ab3dEf7h")));
        assert!(!should_enforce(false, &settings, Some("1234567890")));
    }
}
