//! Date helper functions

use chrono::{Datelike, NaiveDate};

/// Format a date using a Moment.js-style format string
///
/// Supports the `Do` token (day of month with English ordinal suffix),
/// which chrono has no specifier for.
///
/// # Examples
/// ```ignore
/// format_date(&date, "MMMM Do, YYYY") // -> "March 1st, 2020"
/// ```
pub fn format_date(date: &NaiveDate, format: &str) -> String {
    // Split on `Do` first so the remaining pieces can go through chrono
    let ordinal_day = ordinal(date.day());
    format
        .split("Do")
        .map(|part| {
            let chrono_format = moment_to_chrono_format(part);
            date.format(&chrono_format).to_string()
        })
        .collect::<Vec<_>>()
        .join(&ordinal_day)
}

/// Format a date the way the listing and post pages show it
pub fn display_date(date: &NaiveDate) -> String {
    format_date(date, "MMMM Do, YYYY")
}

/// Format a date in ISO 8601 form (`2020-03-01`)
pub fn date_iso(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Format a date for RSS `pubDate` (RFC 2822, midnight UTC)
pub fn date_rfc2822(date: &NaiveDate) -> String {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().to_rfc2822())
        .unwrap_or_default()
}

/// English ordinal for a day of month (1 -> "1st", 22 -> "22nd")
pub fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}

/// Convert Moment.js format to chrono format
fn moment_to_chrono_format(format: &str) -> String {
    let replacements = [
        // Year
        ("YYYY", "%Y"),
        ("YY", "%y"),
        // Month
        ("MMMM", "%B"),
        ("MMM", "%b"),
        ("MM", "%m"),
        // Day of month
        ("DDDD", "%j"),
        ("DD", "%d"),
        // Day of week
        ("dddd", "%A"),
        ("ddd", "%a"),
    ];

    let mut result = format.to_string();

    for (from, to) in replacements {
        result = result.replace(from, to);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_format_date() {
        let d = date(2024, 1, 15);
        assert_eq!(format_date(&d, "YYYY-MM-DD"), "2024-01-15");
        assert_eq!(format_date(&d, "YYYY/MM/DD"), "2024/01/15");
    }

    #[test]
    fn test_display_date() {
        assert_eq!(display_date(&date(2020, 3, 1)), "March 1st, 2020");
        assert_eq!(display_date(&date(2019, 12, 31)), "December 31st, 2019");
        assert_eq!(display_date(&date(2020, 1, 12)), "January 12th, 2020");
        assert_eq!(display_date(&date(2020, 2, 23)), "February 23rd, 2020");
    }

    #[test]
    fn test_ordinal() {
        assert_eq!(ordinal(1), "1st");
        assert_eq!(ordinal(2), "2nd");
        assert_eq!(ordinal(3), "3rd");
        assert_eq!(ordinal(4), "4th");
        assert_eq!(ordinal(11), "11th");
        assert_eq!(ordinal(12), "12th");
        assert_eq!(ordinal(13), "13th");
        assert_eq!(ordinal(21), "21st");
    }

    #[test]
    fn test_date_rfc2822() {
        assert_eq!(
            date_rfc2822(&date(2020, 3, 1)),
            "Sun, 1 Mar 2020 00:00:00 +0000"
        );
    }

    #[test]
    fn test_moment_to_chrono() {
        assert_eq!(moment_to_chrono_format("YYYY-MM-DD"), "%Y-%m-%d");
        assert_eq!(moment_to_chrono_format("MMMM , YYYY"), "%B , %Y");
    }
}
