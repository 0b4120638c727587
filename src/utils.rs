// Utility functions
use chrono::{DateTime, NaiveDate};

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y", "%m/%d/%Y"];

/// Parses a calendar date from the formats spreadsheets usually export.
/// Timestamps are accepted and truncated to their date.
pub fn parse_date(date_str: &str) -> Option<NaiveDate> {
    let s = date_str.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    // "2024-01-05 00:00:00" as written by pandas
    s.split_whitespace()
        .next()
        .filter(|head| head.len() < s.len())
        .and_then(parse_date)
}

/// Percentage change from `from` to `to`; `None` when `from` is zero.
pub fn pct_change(from: f64, to: f64) -> Option<f64> {
    if from == 0.0 {
        return None;
    }
    Some((to - from) / from * 100.0)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_date_layouts() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(parse_date("2024-03-07"), Some(expected));
        assert_eq!(parse_date("2024/03/07"), Some(expected));
        assert_eq!(parse_date("07.03.2024"), Some(expected));
        assert_eq!(parse_date("03/07/2024"), Some(expected));
        assert_eq!(parse_date("2024-03-07T15:30:00Z"), Some(expected));
        assert_eq!(parse_date(" 2024-03-07 00:00:00 "), Some(expected));
        assert_eq!(parse_date("yesterday"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn pct_change_guards_zero_base() {
        assert_eq!(pct_change(0.0, 10.0), None);
        let change = pct_change(100.0, 97.0).unwrap();
        assert!((change + 3.0).abs() < 1e-9);
    }

    #[test]
    fn round2_keeps_two_places() {
        assert_eq!(round2(2.345678), 2.35);
        assert_eq!(round2(-0.126), -0.13);
    }
}
