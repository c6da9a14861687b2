//! The fixed timestamp profile.
//!
//! Grants compare `exp` against now as strings. That only matches
//! chronological order when both sides are zero-padded UTC with exactly
//! three fractional digits, so anything else is refused up front.

use chrono::{DateTime, NaiveDateTime, Utc};

/// `2026-01-14T12:00:00.000Z`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Render an instant in the profile.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Now, in the profile.
pub fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}

/// True if `s` is exactly what [`format_timestamp`] would produce.
pub fn is_profile_timestamp(s: &str) -> bool {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .map(|dt| dt.format(TIMESTAMP_FORMAT).to_string() == s)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format() {
        let at = Utc.with_ymd_and_hms(2026, 1, 14, 12, 0, 0).unwrap();
        assert_eq!(format_timestamp(at), "2026-01-14T12:00:00.000Z");
    }

    #[test]
    fn test_profile_accepts_canonical_only() {
        assert!(is_profile_timestamp("2026-01-14T12:00:00.000Z"));
        assert!(is_profile_timestamp("1999-12-31T23:59:59.999Z"));

        assert!(!is_profile_timestamp("2026-01-14T12:00:00Z"));
        assert!(!is_profile_timestamp("2026-01-14T12:00:00.000+00:00"));
        assert!(!is_profile_timestamp("2026-1-14T12:00:00.000Z"));
        assert!(!is_profile_timestamp("2026-01-14 12:00:00.000Z"));
        assert!(!is_profile_timestamp("2026-01-14T12:00:00.000000Z"));
        assert!(!is_profile_timestamp(""));
    }

    #[test]
    fn test_now_is_in_profile() {
        assert!(is_profile_timestamp(&now_timestamp()));
    }
}
