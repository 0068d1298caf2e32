//! Red Packet Guard - Telegram group moderation bot.
//!
//! Deletes any group message that is not a red packet code (alphanumeric, 8
//! or 10 characters), counts violations per user, and escalates warning →
//! timeout → ban against per-group thresholds. Admins edit the thresholds
//! through an inline configuration dialog in private chat or through the
//! companion mini-app, whose settings API runs alongside the bot.
//!
//! ## Architecture
//!
//! - `config` - Environment configuration
//! - `store` - In-memory settings and dialog-session stores
//! - `moderation` - Code validation and violation escalation
//! - `permissions` - Admin checking with caching
//! - `bot` - Dispatcher wiring (with Throttle for API rate limiting)
//! - `plugins` - Command handlers
//! - `events` - Message-stream enforcement
//! - `dialog` - Threshold configuration wizard
//! - `webapp` - Mini-app settings API (axum)

mod bot;
mod config;
mod dialog;
mod events;
mod moderation;
mod permissions;
mod plugins;
mod store;
mod utils;
mod webapp;

use teloxide::adaptors::throttle::Limits;
use teloxide::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::Config;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file first (before anything else)
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("redpacket_guard=info,teloxide=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting Red Packet Guard...");

    let config = Config::from_env();
    info!("Configuration loaded successfully");

    // Throttle keeps us inside Telegram's rate limits; important here since
    // a spam wave means a burst of deletes and notices.
    let bot = Bot::new(&config.bot_token).throttle(Limits::default());

    let me = bot.get_me().await?;
    info!("Bot username: @{}", me.username());

    let bot_username = config
        .bot_username
        .clone()
        .unwrap_or_else(|| me.username().to_string());

    let state = bot::AppState::new(bot.clone(), bot_username);

    // Settings API for the mini-app, sharing the same stores.
    webapp::spawn(
        webapp::WebAppState {
            settings: state.settings.clone(),
            permissions: state.permissions.clone(),
            bot_token: config.bot_token.clone(),
            bot_id: me.id,
        },
        config.webapp_port,
    );

    info!("Starting bot in polling mode...");
    bot::build_dispatcher(bot, state).dispatch().await;

    Ok(())
}
