use crate::model::PricePoint;

pub fn normalize_ticker(raw: &str) -> String {
    raw.trim().to_string()
}

pub fn normalize_column(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Sorts a series ascending by date and drops repeated dates, keeping the
/// first row seen for each date.
pub fn normalize_series(prices: &mut Vec<PricePoint>) {
    // stable sort keeps file order among equal dates
    prices.sort_by_key(|p| p.date);
    prices.dedup_by_key(|p| p.date);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn point(d: u32, close: f64) -> PricePoint {
        PricePoint::new(NaiveDate::from_ymd_opt(2024, 5, d).unwrap(), close)
    }

    #[test]
    fn series_is_sorted_and_unique() {
        let mut prices = vec![point(3, 3.0), point(1, 1.0), point(3, 30.0), point(2, 2.0)];
        normalize_series(&mut prices);
        assert_eq!(prices, vec![point(1, 1.0), point(2, 2.0), point(3, 3.0)]);
    }

    #[test]
    fn names_are_trimmed() {
        assert_eq!(normalize_ticker("  OMN-ZA "), "OMN-ZA");
        assert_eq!(normalize_column(" Close "), "close");
    }
}
