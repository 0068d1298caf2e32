//! Restriction duration resolution.
//!
//! A duration spec is either a preset token ("10m", "1h", "6h", "1d", "7d",
//! "30d") or the literal "custom", in which case a separately supplied
//! `<integer><unit>` string is parsed instead. Unit is one of m (minutes),
//! h (hours), d (days). Anything unparsable falls back to 24 hours.

/// Fallback when a duration spec cannot be parsed: 24 hours.
pub const FALLBACK_SECS: u64 = 86_400;

/// Resolve a duration spec to seconds.
///
/// Shared by both timeout and ban resolution; `custom` is only consulted
/// when `spec` is the literal "custom".
pub fn resolve(spec: &str, custom: Option<&str>) -> u64 {
    let raw = if spec == "custom" {
        custom.unwrap_or("")
    } else {
        spec
    };
    parse_spec(raw).unwrap_or(FALLBACK_SECS)
}

/// Parse a `<integer><unit>` duration string (e.g. "10m", "6h", "30d").
fn parse_spec(input: &str) -> Option<u64> {
    let input = input.trim();
    if input.len() < 2 || !input.is_ascii() {
        return None;
    }

    let (digits, unit) = input.split_at(input.len() - 1);
    let amount: u64 = digits.parse().ok()?;

    let secs = match unit {
        "m" => amount.checked_mul(60)?,
        "h" => amount.checked_mul(3600)?,
        "d" => amount.checked_mul(86_400)?,
        _ => return None,
    };

    // Restriction end times go through i64 timestamp arithmetic; anything
    // that wouldn't fit is as good as unparsable.
    (secs <= i64::MAX as u64).then_some(secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        assert_eq!(resolve("10m", None), 600);
        assert_eq!(resolve("1h", None), 3600);
        assert_eq!(resolve("6h", None), 21_600);
        assert_eq!(resolve("1d", None), 86_400);
        assert_eq!(resolve("7d", None), 604_800);
        assert_eq!(resolve("30d", None), 2_592_000);
    }

    #[test]
    fn test_two_hours() {
        assert_eq!(resolve("2h", None), 7200);
    }

    #[test]
    fn test_custom_value() {
        assert_eq!(resolve("custom", Some("90d")), 90 * 86_400);
        assert_eq!(resolve("custom", Some("45m")), 2700);
    }

    #[test]
    fn test_fallback() {
        assert_eq!(resolve("bogus", None), FALLBACK_SECS);
        assert_eq!(resolve("custom", None), FALLBACK_SECS);
        assert_eq!(resolve("custom", Some("soon")), FALLBACK_SECS);
        assert_eq!(resolve("", None), FALLBACK_SECS);
        assert_eq!(resolve("5w", None), FALLBACK_SECS);
        assert_eq!(resolve("-5m", None), FALLBACK_SECS);
    }

    #[test]
    fn test_overflowing_values_fall_back() {
        // The custom value arrives unvalidated from the mini-app; absurd
        // magnitudes must read as unparsable, not panic or wrap.
        assert_eq!(resolve("custom", Some("400000000000000d")), FALLBACK_SECS);
        assert_eq!(resolve("18446744073709551615m", None), FALLBACK_SECS);
        // Fits u64 but not an i64 timestamp offset.
        assert_eq!(resolve("custom", Some("200000000000000000m")), FALLBACK_SECS);
    }
}
