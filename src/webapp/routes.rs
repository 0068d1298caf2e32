//! Settings API endpoints for the mini-app.
//!
//! Two POST endpoints, both authenticated by the signed `initData` payload:
//! `/api/check-permission` reports the caller's admin standing plus current
//! settings, `/api/settings` applies a partial settings update. These are
//! the only way the mini-app mutates group thresholds; they write through
//! the same [`SettingsStore`] the bot uses.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use teloxide::types::{ChatId, UserId};
use tracing::{info, warn};

use super::auth::{self, WebAppUser};
use super::WebAppState;
use crate::store::{GroupSettings, SettingsPatch};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckPermissionRequest {
    pub init_data: String,
    #[serde(default)]
    pub chat_id: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckPermissionResponse {
    pub is_admin: bool,
    pub is_bot_admin: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<GroupSettings>,
    pub groups: Vec<GroupEntry>,
}

#[derive(Debug, Serialize)]
pub struct GroupEntry {
    pub id: i64,
    pub title: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    pub init_data: String,
    pub chat_id: i64,
    pub settings: SettingsPatch,
}

#[derive(Debug, Serialize)]
pub struct UpdateSettingsResponse {
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn unauthorized(e: auth::AuthError) -> (StatusCode, Json<ErrorResponse>) {
    warn!("rejected settings-api request: {}", e);
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            error: "unauthorized".to_string(),
        }),
    )
}

fn authenticate(
    state: &WebAppState,
    init_data: &str,
) -> Result<WebAppUser, (StatusCode, Json<ErrorResponse>)> {
    auth::verify_init_data(init_data, &state.bot_token).map_err(unauthorized)
}

/// POST /api/check-permission
pub async fn check_permission(
    State(state): State<WebAppState>,
    Json(req): Json<CheckPermissionRequest>,
) -> Result<Json<CheckPermissionResponse>, (StatusCode, Json<ErrorResponse>)> {
    let user = authenticate(&state, &req.init_data)?;
    let user_id = UserId(user.id);

    // Groups the caller administers, out of the groups the bot has seen.
    let mut groups = Vec::new();
    for (id, title) in state.settings.known_groups() {
        if state
            .permissions
            .is_admin(ChatId(id), user_id)
            .await
            .unwrap_or(false)
        {
            groups.push(GroupEntry { id, title });
        }
    }

    let (is_admin, is_bot_admin, group_name, settings) = match req.chat_id {
        Some(chat_id) => {
            let is_admin = state
                .permissions
                .is_admin(ChatId(chat_id), user_id)
                .await
                .unwrap_or(false);
            let is_bot_admin = state
                .permissions
                .is_admin(ChatId(chat_id), state.bot_id)
                .await
                .unwrap_or(false);
            let group_settings = state.settings.get(chat_id);
            let group_name = group_settings.title.clone();
            // Settings are only disclosed to that group's admins.
            let settings = is_admin.then_some(group_settings);
            (is_admin, is_bot_admin, group_name, settings)
        }
        None => (!groups.is_empty(), false, None, None),
    };

    Ok(Json(CheckPermissionResponse {
        is_admin,
        is_bot_admin,
        group_name,
        settings,
        groups,
    }))
}

/// POST /api/settings
pub async fn update_settings(
    State(state): State<WebAppState>,
    Json(req): Json<UpdateSettingsRequest>,
) -> Result<Json<UpdateSettingsResponse>, (StatusCode, Json<ErrorResponse>)> {
    let user = authenticate(&state, &req.init_data)?;

    if !state
        .permissions
        .is_admin(ChatId(req.chat_id), UserId(user.id))
        .await
        .unwrap_or(false)
    {
        return Err((
            StatusCode::FORBIDDEN,
            Json(ErrorResponse {
                error: "not an admin of this group".to_string(),
            }),
        ));
    }

    state.settings.update(req.chat_id, &req.settings);
    info!("user {} updated settings for group {}", user.id, req.chat_id);

    Ok(Json(UpdateSettingsResponse { success: true }))
}
