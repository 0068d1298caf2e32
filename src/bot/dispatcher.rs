//! Message dispatcher setup.
//!
//! Builds the dispatcher with the command, dialog and enforcement handlers.

use teloxide::adaptors::Throttle;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;

use crate::events;
use crate::moderation::ViolationTracker;
use crate::permissions::Permissions;
use crate::plugins;
use crate::store::{SessionStore, SettingsStore};

/// Bot type with Throttle adaptor for automatic rate limiting.
pub type ThrottledBot = Throttle<Bot>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Per-group settings (thresholds, durations, flags).
    pub settings: SettingsStore,

    /// Per-(group, user) violation counters.
    pub violations: ViolationTracker,

    /// In-progress configuration dialogs, one per admin.
    pub sessions: SessionStore,

    /// Admin checker with caching.
    pub permissions: Permissions,

    /// Bot username (without @) for deep link construction.
    pub bot_username: String,
}

impl AppState {
    pub fn new(bot: ThrottledBot, bot_username: String) -> Self {
        // Permissions needs the inner Bot for API calls.
        let permissions = Permissions::new(bot.inner().clone());

        Self {
            settings: SettingsStore::new(),
            violations: ViolationTracker::new(),
            sessions: SessionStore::new(),
            permissions,
            bot_username,
        }
    }
}

/// Build the dispatcher with all handlers.
pub fn build_dispatcher(
    bot: ThrottledBot,
    state: AppState,
) -> Dispatcher<ThrottledBot, anyhow::Error, teloxide::dispatching::DefaultKey> {
    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
}

/// Build the handler schema.
fn schema() -> UpdateHandler<anyhow::Error> {
    use teloxide::dispatching::UpdateFilterExt;

    // Commands first, then dialog text input in private chats, then code
    // enforcement on everything else said in groups.
    let message_handler = Update::filter_message()
        .branch(plugins::command_handler())
        .branch(events::dialog_text_handler())
        .branch(events::message_event_handler());

    dptree::entry()
        .branch(message_handler)
        .branch(plugins::callback_handler())
}
