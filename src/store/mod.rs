//! In-memory stores.
//!
//! All bot state lives in these process-lifetime maps; nothing is persisted
//! across restarts.

pub mod sessions;
pub mod settings;

pub use sessions::{ConfigSession, LimitKind, SessionStore, Step, StepError};
pub use settings::{GroupSettings, SettingsPatch, SettingsStore};
