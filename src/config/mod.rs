//! Configuration module.
//!
//! Loads configuration from environment variables.

use std::env;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub bot_token: String,

    /// Bot username (without @) for deep link construction.
    /// Optional - will be fetched via getMe if not set.
    pub bot_username: Option<String>,

    /// Port for the mini-app settings API.
    pub webapp_port: u16,
}

impl Config {
    /// Load configuration from environment variables. The caller is expected
    /// to have loaded `.env` already.
    ///
    /// # Panics
    /// Panics if `BOT_TOKEN` is not set — the only fatal startup condition.
    pub fn from_env() -> Self {
        let bot_username = env::var("BOT_USERNAME")
            .ok()
            .map(|s| s.trim_start_matches('@').to_string())
            .filter(|s| !s.is_empty());

        let webapp_port = env::var("WEBAPP_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        Self {
            bot_token: env::var("BOT_TOKEN").expect("BOT_TOKEN must be set"),
            bot_username,
            webapp_port,
        }
    }
}
