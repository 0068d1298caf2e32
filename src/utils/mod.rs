//! Utility functions.

use teloxide::types::User;

/// Escape text for HTML parse mode.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Display name for notices: @username when set, otherwise first (+ last)
/// name.
pub fn display_name(user: &User) -> String {
    match &user.username {
        Some(u) => format!("@{}", u),
        None => match &user.last_name {
            Some(last) => format!("{} {}", user.first_name, last),
            None => user.first_name.clone(),
        },
    }
}

/// Human-readable duration for notices ("45 minutes", "2 hours", "7 days").
pub fn format_duration(secs: u64) -> String {
    fn plural(n: u64, unit: &str) -> String {
        if n == 1 {
            format!("1 {}", unit)
        } else {
            format!("{} {}s", n, unit)
        }
    }

    if secs < 3600 {
        plural(secs.max(60) / 60, "minute")
    } else if secs < 86_400 {
        plural(secs / 3600, "hour")
    } else {
        plural(secs / 86_400, "day")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(600), "10 minutes");
        assert_eq!(format_duration(3600), "1 hour");
        assert_eq!(format_duration(7200), "2 hours");
        assert_eq!(format_duration(86_400), "1 day");
        assert_eq!(format_duration(604_800), "7 days");
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("<b>&</b>"), "&lt;b&gt;&amp;&lt;/b&gt;");
    }
}
