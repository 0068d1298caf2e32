//! Mini-app settings API.
//!
//! A small axum server that runs next to the bot dispatcher and lets the
//! Telegram mini-app read and edit group thresholds.

mod auth;
mod routes;

use std::net::SocketAddr;

use axum::routing::post;
use axum::Router;
use teloxide::types::UserId;
use tracing::info;

use crate::permissions::Permissions;
use crate::store::SettingsStore;

/// Shared state for the API handlers.
#[derive(Clone)]
pub struct WebAppState {
    pub settings: SettingsStore,
    pub permissions: Permissions,
    /// Bot token, for initData signature verification.
    pub bot_token: String,
    /// The bot's own user id, for isBotAdmin checks.
    pub bot_id: UserId,
}

/// Spawn the settings API server.
pub fn spawn(state: WebAppState, port: u16) {
    let app = Router::new()
        .route("/api/check-permission", post(routes::check_permission))
        .route("/api/settings", post(routes::update_settings))
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    tokio::spawn(async move {
        info!("settings API listening on {}", addr);
        match tokio::net::TcpListener::bind(addr).await {
            Ok(listener) => {
                if let Err(e) = axum::serve(listener, app).await {
                    tracing::error!("settings API server error: {}", e);
                }
            }
            Err(e) => tracing::error!("failed to bind settings API on {}: {}", addr, e),
        }
    });
}
