//! Configuration dialog.
//!
//! The multi-step wizard admins walk through to change a group's timeout or
//! ban limit: choose group → choose limit → confirm. Step state lives in
//! [`crate::store::SessionStore`]; this module renders the prompts and
//! reacts to callback presses and private-chat text input.
//!
//! The wizard only runs in private chat. Pressing a configure button inside
//! a group sends a deep link over to private chat instead, carrying the
//! pending action and group id; no session exists until the admin arrives.

mod action;

pub use action::CallbackAction;

use teloxide::prelude::*;
use teloxide::types::{
    ChatId, InlineKeyboardButton, InlineKeyboardMarkup, MaybeInaccessibleMessage, MessageId,
    ParseMode, UserId,
};
use tracing::info;

use crate::bot::dispatcher::{AppState, ThrottledBot};
use crate::plugins::help;
use crate::store::{ConfigSession, LimitKind, Step, StepError};

/// Handle a decoded callback press.
pub async fn handle_callback(
    bot: ThrottledBot,
    q: CallbackQuery,
    state: AppState,
    action: CallbackAction,
) -> anyhow::Result<()> {
    bot.answer_callback_query(&q.id).await?;

    let msg = match &q.message {
        Some(m) => m,
        None => return Ok(()),
    };
    let chat_id = msg.chat().id;
    let message_id = msg.id();
    let admin_id = q.from.id;

    match action {
        CallbackAction::Privacy => {
            bot.send_message(chat_id, help::PRIVACY_POLICY)
                .parse_mode(ParseMode::Html)
                .await?;
        }

        CallbackAction::Configure(kind) => {
            start_configuration(&bot, &state, msg, admin_id, kind).await?;
        }

        CallbackAction::SetLimit(limit) => {
            let result = state
                .sessions
                .with_session(admin_id.0, |s| s.choose_limit(limit));
            match result {
                Some(Ok(())) => {
                    if let Some(session) = state.sessions.get(admin_id.0) {
                        show_confirmation(&bot, chat_id, None, &session).await?;
                    }
                }
                Some(Err(StepError::LimitOutOfRange)) => {
                    bot.send_message(chat_id, "❌ Limit must be between 1 and 100.")
                        .await?;
                }
                // Stale button from an earlier step, or no session at all.
                Some(Err(StepError::WrongStep)) | None => {}
            }
        }

        CallbackAction::Confirm => {
            confirm_session(&bot, &state, chat_id, message_id, admin_id).await?;
        }

        CallbackAction::BackToAction => {
            state.sessions.end(admin_id.0);
            let settings = state.settings.get(chat_id.0);
            bot.edit_message_text(chat_id, message_id, help::panel_text(&settings))
                .parse_mode(ParseMode::Html)
                .reply_markup(help::panel_keyboard())
                .await?;
        }

        CallbackAction::BackToGroup => {
            if state
                .sessions
                .with_session(admin_id.0, |s| s.back_to(Step::ChooseGroup))
                .is_some()
            {
                show_group_prompt(&bot, chat_id, Some(message_id)).await?;
            }
        }

        CallbackAction::BackToLimit => {
            if let Some(session) = state.sessions.get(admin_id.0) {
                state
                    .sessions
                    .with_session(admin_id.0, |s| s.back_to(Step::ChooseLimit));
                show_limit_prompt(&bot, chat_id, Some(message_id), session.action).await?;
            }
        }
    }

    Ok(())
}

/// Entry from a configure button on the help panel.
async fn start_configuration(
    bot: &ThrottledBot,
    state: &AppState,
    msg: &MaybeInaccessibleMessage,
    admin_id: UserId,
    kind: LimitKind,
) -> anyhow::Result<()> {
    let chat_id = msg.chat().id;

    if !msg.chat().is_private() {
        // Group context: only verified admins get the redirect, and the
        // session is not created until they arrive in private chat.
        if !state.permissions.is_admin(chat_id, admin_id).await.unwrap_or(false) {
            return Ok(());
        }

        let payload = match kind {
            LimitKind::Timeout => format!("config_timeout_{}", chat_id.0),
            LimitKind::Ban => format!("config_ban_{}", chat_id.0),
        };
        let url = format!("https://t.me/{}?start={}", state.bot_username, payload)
            .parse()
            .expect("deep link url");
        let keyboard =
            InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::url("Go to Private Chat", url)]]);

        bot.send_message(
            chat_id,
            "Please continue configuration in private chat for security.",
        )
        .reply_markup(keyboard)
        .await?;
        return Ok(());
    }

    state.sessions.start(admin_id.0, ConfigSession::new(kind));
    show_group_prompt(bot, chat_id, None).await?;
    Ok(())
}

/// Deep-link arrival in private chat: `config_<action>_<chat_id>`.
///
/// The group is already known, so the session skips straight to the limit
/// step — after re-verifying the admin actually administers that group.
pub async fn start_prebound(
    bot: &ThrottledBot,
    state: &AppState,
    private_chat: ChatId,
    admin_id: UserId,
    kind: LimitKind,
    group_id: i64,
) -> anyhow::Result<()> {
    if !state
        .permissions
        .is_admin(ChatId(group_id), admin_id)
        .await
        .unwrap_or(false)
    {
        bot.send_message(
            private_chat,
            "❌ You do not have permission to change settings for this group.",
        )
        .await?;
        return Ok(());
    }

    state
        .sessions
        .start(admin_id.0, ConfigSession::for_group(kind, group_id));
    show_limit_prompt(bot, private_chat, None, kind).await?;
    Ok(())
}

/// Resume an existing session at the group step (`/start config`).
pub async fn resume(
    bot: &ThrottledBot,
    state: &AppState,
    private_chat: ChatId,
    admin_id: UserId,
) -> anyhow::Result<bool> {
    if state.sessions.get(admin_id.0).is_none() {
        return Ok(false);
    }
    show_group_prompt(bot, private_chat, None).await?;
    Ok(true)
}

/// Text input while a session is live (private chat only).
///
/// Returns `true` when the text was consumed by the dialog.
pub async fn handle_text(
    bot: &ThrottledBot,
    msg: &Message,
    state: &AppState,
) -> anyhow::Result<bool> {
    if !msg.chat.is_private() {
        return Ok(false);
    }
    let user = match msg.from.as_ref() {
        Some(u) => u,
        None => return Ok(false),
    };
    let session = match state.sessions.get(user.id.0) {
        Some(s) => s,
        None => return Ok(false),
    };
    let text = match msg.text() {
        Some(t) if !t.starts_with('/') => t.trim(),
        _ => return Ok(false),
    };

    match session.step {
        Step::ChooseGroup => {
            let group_id: i64 = match text.parse() {
                Ok(id) => id,
                Err(_) => {
                    bot.send_message(msg.chat.id, "❌ That doesn't look like a group ID. Please try again.")
                        .await?;
                    return Ok(true);
                }
            };

            // Membership check against the named group; an unknown id or an
            // API failure both read as "not an admin there".
            if state
                .permissions
                .is_admin(ChatId(group_id), user.id)
                .await
                .unwrap_or(false)
            {
                state
                    .sessions
                    .with_session(user.id.0, |s| s.choose_group(group_id));
                show_limit_prompt(bot, msg.chat.id, None, session.action).await?;
            } else {
                bot.send_message(
                    msg.chat.id,
                    "❌ You do not have permission to change settings for this group or the ID is \
                     invalid. Please try again or check if I am an admin there.",
                )
                .await?;
            }
            Ok(true)
        }

        Step::ChooseLimit => {
            match text.parse::<u32>() {
                Ok(limit) => {
                    match state
                        .sessions
                        .with_session(user.id.0, |s| s.choose_limit(limit))
                    {
                        Some(Ok(())) => {
                            if let Some(session) = state.sessions.get(user.id.0) {
                                show_confirmation(bot, msg.chat.id, None, &session).await?;
                            }
                        }
                        _ => {
                            bot.send_message(msg.chat.id, "❌ Limit must be between 1 and 100.")
                                .await?;
                        }
                    }
                }
                Err(_) => {
                    bot.send_message(msg.chat.id, "❌ Please send a number between 1 and 100.")
                        .await?;
                }
            }
            Ok(true)
        }

        // Confirmation only advances via buttons.
        Step::Confirm => Ok(false),
    }
}

/// Apply the session through the settings store and close it out.
async fn confirm_session(
    bot: &ThrottledBot,
    state: &AppState,
    chat_id: ChatId,
    message_id: MessageId,
    admin_id: UserId,
) -> anyhow::Result<()> {
    let session = match state.sessions.get(admin_id.0) {
        Some(s) if s.step == Step::Confirm => s,
        _ => return Ok(()),
    };
    let (group_id, limit) = match (session.group_id, session.limit) {
        (Some(g), Some(l)) => (g, l),
        _ => return Ok(()),
    };

    match session.action {
        LimitKind::Timeout => state.settings.set_timeout_limit(group_id, limit),
        LimitKind::Ban => state.settings.set_ban_limit(group_id, limit),
    }
    state.sessions.end(admin_id.0);

    info!(
        "admin {} set {} limit to {} for group {}",
        admin_id,
        session.action.label(),
        limit,
        group_id
    );

    bot.edit_message_text(
        chat_id,
        message_id,
        format!(
            "✅ Settings Updated for group!\n\n{} limit set to: <b>{}</b>",
            session.action.label(),
            limit
        ),
    )
    .parse_mode(ParseMode::Html)
    .await?;

    Ok(())
}

async fn show_group_prompt(
    bot: &ThrottledBot,
    chat_id: ChatId,
    message_id: Option<MessageId>,
) -> anyhow::Result<()> {
    let text = "Step 2: Choose Group\n\nPlease enter the Group ID you wish to configure.\n\n\
                <i>Note: You must be an admin of the group.</i>";
    let keyboard = InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        "⬅️ Back",
        CallbackAction::BackToAction.as_data(),
    )]]);

    send_or_edit(bot, chat_id, message_id, text.to_string(), keyboard).await
}

async fn show_limit_prompt(
    bot: &ThrottledBot,
    chat_id: ChatId,
    message_id: Option<MessageId>,
    kind: LimitKind,
) -> anyhow::Result<()> {
    let text = format!(
        "Step 3: Choose Violation Count for {}\n\nSelect a preset or send a custom number:",
        kind.label()
    );

    let preset = |n: u32| InlineKeyboardButton::callback(n.to_string(), CallbackAction::SetLimit(n).as_data());
    let keyboard = InlineKeyboardMarkup::new(vec![
        vec![preset(1), preset(3), preset(5)],
        vec![preset(10), preset(50), preset(100)],
        vec![InlineKeyboardButton::callback(
            "⬅️ Back",
            CallbackAction::BackToGroup.as_data(),
        )],
    ]);

    send_or_edit(bot, chat_id, message_id, text, keyboard).await
}

async fn show_confirmation(
    bot: &ThrottledBot,
    chat_id: ChatId,
    message_id: Option<MessageId>,
    session: &ConfigSession,
) -> anyhow::Result<()> {
    let text = format!(
        "Step 4: Confirmation Screen\n\nSummary:\nGroup ID: <code>{}</code>\nAction Type: {}\nViolation Count: {}",
        session.group_id.unwrap_or_default(),
        session.action.label(),
        session.limit.unwrap_or_default()
    );
    let keyboard = InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback(
            "✅ Confirm",
            CallbackAction::Confirm.as_data(),
        )],
        vec![InlineKeyboardButton::callback(
            "⬅️ Back",
            CallbackAction::BackToLimit.as_data(),
        )],
    ]);

    send_or_edit(bot, chat_id, message_id, text, keyboard).await
}

async fn send_or_edit(
    bot: &ThrottledBot,
    chat_id: ChatId,
    message_id: Option<MessageId>,
    text: String,
    keyboard: InlineKeyboardMarkup,
) -> anyhow::Result<()> {
    match message_id {
        Some(id) => {
            bot.edit_message_text(chat_id, id, text)
                .parse_mode(ParseMode::Html)
                .reply_markup(keyboard)
                .await?;
        }
        None => {
            bot.send_message(chat_id, text)
                .parse_mode(ParseMode::Html)
                .reply_markup(keyboard)
                .await?;
        }
    }
    Ok(())
}
