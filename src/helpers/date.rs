//! Date helper functions

use chrono::{Datelike, NaiveDate};

/// Parse a calendar date in strict `YYYY-MM-DD` form
///
/// Returns `None` for anything else, including non-padded variants like
/// `2025-1-2`.
pub fn parse_iso(date: &str) -> Option<NaiveDate> {
    let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    // zero-padded form only
    if parsed.format("%Y-%m-%d").to_string() == date {
        Some(parsed)
    } else {
        None
    }
}

/// Format a date for display, like `"Monday, October 20"`
///
/// The day of month is not zero-padded.
pub fn display_date(date: NaiveDate) -> String {
    format!("{}, {} {}", date.format("%A"), date.format("%B"), date.day())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_iso() {
        assert_eq!(
            parse_iso("2025-10-20"),
            NaiveDate::from_ymd_opt(2025, 10, 20)
        );
        assert!(parse_iso("2025-1-2").is_none());
        assert!(parse_iso("2025-10-20T00:00:00").is_none());
        assert!(parse_iso("yesterday").is_none());
        assert!(parse_iso("2025-02-30").is_none());
    }

    #[test]
    fn test_display_date() {
        let date = NaiveDate::from_ymd_opt(2025, 10, 20).unwrap();
        assert_eq!(display_date(date), "Monday, October 20");

        let date = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        assert_eq!(display_date(date), "Thursday, January 2");
    }
}
