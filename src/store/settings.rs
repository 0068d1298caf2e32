//! Per-group moderation settings.
//!
//! In-memory store with hard-coded defaults; overrides come from the
//! configuration dialog or the mini-app settings API. Wire names are
//! camelCase to match the mini-app front-end.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// What a ban means: kicked until `banDuration` elapses, or for good.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BanType {
    Temporary,
    Permanent,
}

/// Settings for one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSettings {
    pub timeout_enabled: bool,
    pub ban_enabled: bool,
    pub spam_control_enabled: bool,

    pub timeout_limit: u32,
    pub ban_limit: u32,

    /// Preset token ("10m", "1h", ...) or "custom".
    pub timeout_duration: String,
    pub ban_duration: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_duration_custom: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ban_duration_custom: Option<String>,

    pub ban_type: BanType,

    pub timeout_notify: bool,
    pub ban_notify: bool,

    /// Cached group title, filled in from observed messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Default for GroupSettings {
    fn default() -> Self {
        Self {
            timeout_enabled: true,
            ban_enabled: true,
            spam_control_enabled: true,
            timeout_limit: 3,
            ban_limit: 5,
            timeout_duration: "1d".to_string(),
            ban_duration: "7d".to_string(),
            timeout_duration_custom: None,
            ban_duration_custom: None,
            ban_type: BanType::Temporary,
            timeout_notify: true,
            ban_notify: true,
            title: None,
        }
    }
}

/// Partial settings update, as sent by the mini-app.
///
/// Absent fields leave the stored value untouched; the cached title cannot
/// be changed through a patch.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    pub timeout_enabled: Option<bool>,
    pub ban_enabled: Option<bool>,
    pub spam_control_enabled: Option<bool>,
    pub timeout_limit: Option<u32>,
    pub ban_limit: Option<u32>,
    pub timeout_duration: Option<String>,
    pub ban_duration: Option<String>,
    pub timeout_duration_custom: Option<String>,
    pub ban_duration_custom: Option<String>,
    pub ban_type: Option<BanType>,
    pub timeout_notify: Option<bool>,
    pub ban_notify: Option<bool>,
}

impl SettingsPatch {
    fn apply(&self, settings: &mut GroupSettings) {
        if let Some(v) = self.timeout_enabled {
            settings.timeout_enabled = v;
        }
        if let Some(v) = self.ban_enabled {
            settings.ban_enabled = v;
        }
        if let Some(v) = self.spam_control_enabled {
            settings.spam_control_enabled = v;
        }
        if let Some(v) = self.timeout_limit {
            settings.timeout_limit = v;
        }
        if let Some(v) = self.ban_limit {
            settings.ban_limit = v;
        }
        if let Some(ref v) = self.timeout_duration {
            settings.timeout_duration = v.clone();
        }
        if let Some(ref v) = self.ban_duration {
            settings.ban_duration = v.clone();
        }
        if let Some(ref v) = self.timeout_duration_custom {
            settings.timeout_duration_custom = Some(v.clone());
        }
        if let Some(ref v) = self.ban_duration_custom {
            settings.ban_duration_custom = Some(v.clone());
        }
        if let Some(v) = self.ban_type {
            settings.ban_type = v;
        }
        if let Some(v) = self.timeout_notify {
            settings.timeout_notify = v;
        }
        if let Some(v) = self.ban_notify {
            settings.ban_notify = v;
        }
    }
}

/// In-memory settings store keyed by chat id.
///
/// `get` never returns a partial object: a group without overrides gets the
/// full defaults. Authorization is the caller's concern; everything here
/// assumes admin rights were already verified.
#[derive(Clone)]
pub struct SettingsStore {
    data: Arc<DashMap<i64, GroupSettings>>,
}

impl SettingsStore {
    pub fn new() -> Self {
        Self {
            data: Arc::new(DashMap::new()),
        }
    }

    /// Settings for a group, falling back to defaults when none are stored.
    pub fn get(&self, chat_id: i64) -> GroupSettings {
        self.data
            .get(&chat_id)
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    /// Shallow-merge a patch onto the stored settings, creating the entry
    /// from defaults if needed. Unpatched fields and the title survive.
    pub fn update(&self, chat_id: i64, patch: &SettingsPatch) {
        let mut entry = self.data.entry(chat_id).or_default();
        patch.apply(&mut entry);
    }

    /// Set the timeout violation limit (configuration dialog path).
    pub fn set_timeout_limit(&self, chat_id: i64, limit: u32) {
        self.data.entry(chat_id).or_default().timeout_limit = limit;
    }

    /// Set the ban violation limit (configuration dialog path).
    pub fn set_ban_limit(&self, chat_id: i64, limit: u32) {
        self.data.entry(chat_id).or_default().ban_limit = limit;
    }

    /// Cache the group's display title. Idempotent; empty titles are
    /// ignored so a good cached name is never clobbered.
    pub fn record_title(&self, chat_id: i64, title: &str) {
        if title.is_empty() {
            return;
        }
        let mut entry = self.data.entry(chat_id).or_default();
        if entry.title.as_deref() != Some(title) {
            entry.title = Some(title.to_string());
        }
    }

    /// Groups the bot has seen a title for, for the mini-app group picker.
    pub fn known_groups(&self) -> Vec<(i64, String)> {
        self.data
            .iter()
            .filter_map(|e| e.title.clone().map(|t| (*e.key(), t)))
            .collect()
    }
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_returns_full_defaults() {
        let store = SettingsStore::new();
        let s = store.get(-100);
        assert_eq!(s.timeout_limit, 3);
        assert_eq!(s.ban_limit, 5);
        assert_eq!(s.timeout_duration, "1d");
        assert_eq!(s.ban_duration, "7d");
        assert_eq!(s.ban_type, BanType::Temporary);
        assert!(s.timeout_notify && s.ban_notify);
    }

    #[test]
    fn test_get_is_idempotent() {
        let store = SettingsStore::new();
        store.set_ban_limit(-100, 8);
        assert_eq!(store.get(-100), store.get(-100));
    }

    #[test]
    fn test_patch_preserves_unspecified_fields_and_title() {
        let store = SettingsStore::new();
        store.record_title(-100, "Red Packet Lounge");
        store.update(
            -100,
            &SettingsPatch {
                ban_limit: Some(12),
                ban_type: Some(BanType::Permanent),
                ..SettingsPatch::default()
            },
        );

        let s = store.get(-100);
        assert_eq!(s.ban_limit, 12);
        assert_eq!(s.ban_type, BanType::Permanent);
        // Untouched by the patch:
        assert_eq!(s.timeout_limit, 3);
        assert_eq!(s.title.as_deref(), Some("Red Packet Lounge"));
    }

    #[test]
    fn test_record_title_ignores_empty() {
        let store = SettingsStore::new();
        store.record_title(-100, "Lounge");
        store.record_title(-100, "");
        assert_eq!(store.get(-100).title.as_deref(), Some("Lounge"));
    }

    #[test]
    fn test_known_groups_only_lists_titled() {
        let store = SettingsStore::new();
        store.record_title(-100, "Lounge");
        store.set_ban_limit(-200, 9); // settings but no title yet

        let groups = store.known_groups();
        assert_eq!(groups, vec![(-100, "Lounge".to_string())]);
    }

    #[test]
    fn test_wire_names_are_camel_case() {
        let json = serde_json::to_value(GroupSettings::default()).unwrap();
        assert_eq!(json["timeoutLimit"], 3);
        assert_eq!(json["banDuration"], "7d");
        assert_eq!(json["banType"], "temporary");
        assert!(json.get("title").is_none());
    }
}
