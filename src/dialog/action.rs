//! Callback-data decoding.
//!
//! Every inline-keyboard press carries one of a closed set of actions, so
//! the raw data string is decoded exactly once at the boundary; handlers
//! only ever see the enum.

use crate::store::LimitKind;

/// A decoded callback press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction {
    /// Show the privacy policy.
    Privacy,
    /// Start configuring one of the two limits.
    Configure(LimitKind),
    /// Preset limit button.
    SetLimit(u32),
    /// Apply the pending session.
    Confirm,
    /// Back to the help panel (cancels the session).
    BackToAction,
    /// Back to the group step.
    BackToGroup,
    /// Back to the limit step.
    BackToLimit,
}

impl CallbackAction {
    /// Decode callback data; unknown strings yield `None` and are ignored.
    pub fn parse(data: &str) -> Option<Self> {
        match data {
            "privacy_policy" => Some(Self::Privacy),
            "config_timeout" => Some(Self::Configure(LimitKind::Timeout)),
            "config_ban" => Some(Self::Configure(LimitKind::Ban)),
            "confirm_config" => Some(Self::Confirm),
            "back_to_action" => Some(Self::BackToAction),
            "back_to_group" => Some(Self::BackToGroup),
            "back_to_limit" => Some(Self::BackToLimit),
            _ => data
                .strip_prefix("set_limit_")
                .and_then(|n| n.parse().ok())
                .map(Self::SetLimit),
        }
    }

    /// Encode for keyboard construction; symmetric with `parse`.
    pub fn as_data(&self) -> String {
        match self {
            Self::Privacy => "privacy_policy".to_string(),
            Self::Configure(LimitKind::Timeout) => "config_timeout".to_string(),
            Self::Configure(LimitKind::Ban) => "config_ban".to_string(),
            Self::SetLimit(n) => format!("set_limit_{}", n),
            Self::Confirm => "confirm_config".to_string(),
            Self::BackToAction => "back_to_action".to_string(),
            Self::BackToGroup => "back_to_group".to_string(),
            Self::BackToLimit => "back_to_limit".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_actions() {
        assert_eq!(
            CallbackAction::parse("config_timeout"),
            Some(CallbackAction::Configure(LimitKind::Timeout))
        );
        assert_eq!(
            CallbackAction::parse("set_limit_50"),
            Some(CallbackAction::SetLimit(50))
        );
        assert_eq!(
            CallbackAction::parse("confirm_config"),
            Some(CallbackAction::Confirm)
        );
    }

    #[test]
    fn test_unknown_data_is_ignored() {
        assert_eq!(CallbackAction::parse("set_limit_abc"), None);
        assert_eq!(CallbackAction::parse("warn_remove:1:2"), None);
        assert_eq!(CallbackAction::parse(""), None);
    }

    #[test]
    fn test_round_trip() {
        for action in [
            CallbackAction::Privacy,
            CallbackAction::Configure(LimitKind::Ban),
            CallbackAction::SetLimit(10),
            CallbackAction::Confirm,
            CallbackAction::BackToAction,
            CallbackAction::BackToGroup,
            CallbackAction::BackToLimit,
        ] {
            assert_eq!(CallbackAction::parse(&action.as_data()), Some(action));
        }
    }
}
