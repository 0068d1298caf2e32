//! Admin status checker with caching.

use std::time::Duration;

use moka::sync::Cache;
use teloxide::prelude::*;
use teloxide::types::{ChatId, ChatMemberKind, UserId};
use tracing::debug;

/// Cached creator/administrator lookups.
///
/// Wraps `getChatMember` behind a TTL'd cache so the per-message exemption
/// check doesn't hammer the Telegram API. Callers that need a fail-closed
/// answer use `.unwrap_or(false)` on the result.
#[derive(Clone)]
pub struct Permissions {
    bot: Bot,
    cache: Cache<(i64, u64), bool>,
}

impl Permissions {
    pub fn new(bot: Bot) -> Self {
        let cache = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(Duration::from_secs(300))
            .time_to_idle(Duration::from_secs(120))
            .build();

        Self { bot, cache }
    }

    /// Whether the user is the chat creator or an administrator.
    ///
    /// Negative results are cached too, so repeated spam from the same
    /// non-admin costs one API call per TTL window.
    pub async fn is_admin(&self, chat_id: ChatId, user_id: UserId) -> anyhow::Result<bool> {
        let key = (chat_id.0, user_id.0);

        if let Some(cached) = self.cache.get(&key) {
            debug!("admin cache hit for user {} in chat {}", user_id, chat_id);
            return Ok(cached);
        }

        let member = self.bot.get_chat_member(chat_id, user_id).await?;
        let is_admin = matches!(
            member.kind,
            ChatMemberKind::Owner(_) | ChatMemberKind::Administrator(_)
        );

        self.cache.insert(key, is_admin);
        Ok(is_admin)
    }

    /// Drop the cached status for a user. Call when their admin status may
    /// have changed.
    #[allow(dead_code)]
    pub fn invalidate(&self, chat_id: ChatId, user_id: UserId) {
        self.cache.invalidate(&(chat_id.0, user_id.0));
        debug!(
            "invalidated admin cache for user {} in chat {}",
            user_id, chat_id
        );
    }
}
