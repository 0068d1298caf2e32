//! Violation evaluation.
//!
//! Classifies group messages as valid red packet codes or violations, keeps
//! per-(chat, user) violation counters, and picks the enforcement step by
//! comparing the counter against the group's configured thresholds.

pub mod duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;

use crate::store::settings::{BanType, GroupSettings};

/// A message is a valid red packet code iff it is purely ASCII alphanumeric
/// and exactly 8 or 10 characters long.
pub fn is_valid_code(text: &str) -> bool {
    (text.len() == 8 || text.len() == 10) && text.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Enforcement step selected for a violation.
///
/// Durations are in seconds; `secs == 0` on a ban means permanent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enforcement {
    Warning,
    Timeout { secs: u64 },
    Ban { secs: u64 },
}

/// One user's violation history in one chat.
#[derive(Debug, Clone)]
struct ViolationRecord {
    count: u32,
    #[allow(dead_code)]
    last_violation: DateTime<Utc>,
}

/// In-memory violation counters, keyed per (chat, user).
///
/// Process-lifetime only; counters are lost on restart. Cloning is cheap and
/// shares the underlying map.
#[derive(Clone)]
pub struct ViolationTracker {
    data: Arc<DashMap<(i64, u64), ViolationRecord>>,
}

impl ViolationTracker {
    pub fn new() -> Self {
        Self {
            data: Arc::new(DashMap::new()),
        }
    }

    /// Record a violation and select the enforcement step.
    ///
    /// Increments the counter (creating it at 1), then compares ban first and
    /// timeout second, so a count meeting both limits at once results in a
    /// ban. A ban removes the counter entry entirely; a timeout leaves it in
    /// place so it keeps accumulating toward the ban limit.
    pub fn record_violation(
        &self,
        chat_id: i64,
        user_id: u64,
        settings: &GroupSettings,
    ) -> Enforcement {
        let key = (chat_id, user_id);

        let count = {
            let mut entry = self.data.entry(key).or_insert_with(|| ViolationRecord {
                count: 0,
                last_violation: Utc::now(),
            });
            entry.count += 1;
            entry.last_violation = Utc::now();
            entry.count
        };

        if settings.ban_enabled && count >= settings.ban_limit {
            self.data.remove(&key);
            let secs = match settings.ban_type {
                BanType::Permanent => 0,
                BanType::Temporary => duration::resolve(
                    &settings.ban_duration,
                    settings.ban_duration_custom.as_deref(),
                ),
            };
            return Enforcement::Ban { secs };
        }

        if settings.timeout_enabled && count >= settings.timeout_limit {
            return Enforcement::Timeout {
                secs: duration::resolve(
                    &settings.timeout_duration,
                    settings.timeout_duration_custom.as_deref(),
                ),
            };
        }

        Enforcement::Warning
    }

    /// Current violation count for a user, if any.
    pub fn count(&self, chat_id: i64, user_id: u64) -> Option<u32> {
        self.data.get(&(chat_id, user_id)).map(|r| r.count)
    }

    /// Administrative reset: drop the counter for a user in a chat.
    pub fn reset(&self, chat_id: i64, user_id: u64) {
        self.data.remove(&(chat_id, user_id));
    }
}

impl Default for ViolationTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_validity() {
        assert!(is_valid_code("AB12CD34"));
        assert!(is_valid_code("ab12cd34ef"));
        assert!(is_valid_code("00000000"));

        assert!(!is_valid_code("AB12CD345")); // 9 chars
        assert!(!is_valid_code("AB12CD3")); // 7 chars
        assert!(!is_valid_code("ab12-D34")); // hyphen
        assert!(!is_valid_code("ab12 cd34")); // space
        assert!(!is_valid_code(""));
        assert!(!is_valid_code("/start123"));
        assert!(!is_valid_code("日本語のコード")); // non-ASCII
    }

    #[test]
    fn test_default_escalation_sequence() {
        // Defaults: timeout_limit = 3, ban_limit = 5.
        let tracker = ViolationTracker::new();
        let settings = GroupSettings::default();

        let actions: Vec<_> = (0..5)
            .map(|_| tracker.record_violation(-100, 7, &settings))
            .collect();

        assert_eq!(actions[0], Enforcement::Warning);
        assert_eq!(actions[1], Enforcement::Warning);
        assert!(matches!(actions[2], Enforcement::Timeout { .. }));
        assert!(matches!(actions[3], Enforcement::Timeout { .. }));
        assert!(matches!(actions[4], Enforcement::Ban { .. }));
    }

    #[test]
    fn test_ban_resets_counter_timeout_does_not() {
        let tracker = ViolationTracker::new();
        let settings = GroupSettings::default();

        for _ in 0..3 {
            tracker.record_violation(-100, 7, &settings);
        }
        // Timeout at 3: counter keeps accumulating.
        assert_eq!(tracker.count(-100, 7), Some(3));

        tracker.record_violation(-100, 7, &settings);
        let fifth = tracker.record_violation(-100, 7, &settings);
        assert!(matches!(fifth, Enforcement::Ban { .. }));

        // Ban removed the entry; the next violation starts over at Warning.
        assert_eq!(tracker.count(-100, 7), None);
        let next = tracker.record_violation(-100, 7, &settings);
        assert_eq!(next, Enforcement::Warning);
        assert_eq!(tracker.count(-100, 7), Some(1));
    }

    #[test]
    fn test_ban_wins_when_both_limits_met() {
        let tracker = ViolationTracker::new();
        let settings = GroupSettings {
            timeout_limit: 5,
            ban_limit: 5,
            ..GroupSettings::default()
        };

        let mut last = Enforcement::Warning;
        for _ in 0..5 {
            last = tracker.record_violation(-100, 7, &settings);
        }
        assert!(matches!(last, Enforcement::Ban { .. }));
    }

    #[test]
    fn test_counters_are_per_chat() {
        let tracker = ViolationTracker::new();
        let settings = GroupSettings::default();

        for _ in 0..4 {
            tracker.record_violation(-100, 7, &settings);
        }
        // Fresh chat, same user: back to a plain warning.
        assert_eq!(tracker.record_violation(-200, 7, &settings), Enforcement::Warning);
    }

    #[test]
    fn test_disabled_actions_fall_through() {
        let tracker = ViolationTracker::new();
        let settings = GroupSettings {
            timeout_enabled: false,
            ban_enabled: false,
            ..GroupSettings::default()
        };

        for _ in 0..20 {
            assert_eq!(
                tracker.record_violation(-100, 7, &settings),
                Enforcement::Warning
            );
        }
    }

    #[test]
    fn test_permanent_ban_duration_is_zero() {
        let tracker = ViolationTracker::new();
        let settings = GroupSettings {
            ban_limit: 1,
            ban_type: BanType::Permanent,
            ..GroupSettings::default()
        };

        assert_eq!(
            tracker.record_violation(-100, 7, &settings),
            Enforcement::Ban { secs: 0 }
        );
    }

    #[test]
    fn test_admin_reset() {
        let tracker = ViolationTracker::new();
        let settings = GroupSettings::default();

        tracker.record_violation(-100, 7, &settings);
        tracker.record_violation(-100, 7, &settings);
        tracker.reset(-100, 7);
        assert_eq!(tracker.count(-100, 7), None);
    }
}
