pub struct MarketIndicators;

impl MarketIndicators {
    pub const DEFAULT_SUPPORT_LOOKBACK: usize = 20;

    /// Lowest close in the `lookback` days before `index`, excluding `index`.
    /// With no history the current close is its own support.
    pub fn support_level(closes: &[f64], index: usize, lookback: usize) -> f64 {
        let start = index.saturating_sub(lookback);
        closes[start..index]
            .iter()
            .copied()
            .reduce(f64::min)
            .unwrap_or(closes[index])
    }

    /// Mean of the `window` closes strictly before `index`.
    /// Returns None until a full window of history exists.
    pub fn trailing_mean(closes: &[f64], index: usize, window: usize) -> Option<f64> {
        if window == 0 || index < window {
            return None;
        }
        let slice = &closes[index - window..index];
        Some(slice.iter().sum::<f64>() / window as f64)
    }

    /// True when `price` lies within `tolerance` (relative) of `support`.
    pub fn is_near_support(price: f64, support: f64, tolerance: f64) -> bool {
        if support == 0.0 {
            return false;
        }
        (price - support).abs() / support < tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn support_falls_back_to_current_price_without_history() {
        assert_eq!(MarketIndicators::support_level(&[42.0, 40.0], 0, 20), 42.0);
    }

    #[test]
    fn support_excludes_the_target_day() {
        let closes = [50.0, 48.0, 52.0, 10.0];
        assert_eq!(MarketIndicators::support_level(&closes, 3, 20), 48.0);
    }

    #[test]
    fn support_only_looks_back_the_window() {
        let closes = [1.0, 9.0, 8.0, 7.0, 6.0];
        assert_eq!(MarketIndicators::support_level(&closes, 4, 3), 7.0);
        assert_eq!(MarketIndicators::support_level(&closes, 4, 4), 1.0);
    }

    #[test]
    fn trailing_mean_needs_full_window() {
        let closes = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        assert_eq!(MarketIndicators::trailing_mean(&closes, 4, 5), None);
        assert_eq!(MarketIndicators::trailing_mean(&closes, 5, 5), Some(3.0));
        assert_eq!(MarketIndicators::trailing_mean(&closes, 5, 0), None);
    }

    #[test]
    fn near_support_guards_zero_support() {
        assert!(!MarketIndicators::is_near_support(0.0, 0.0, 0.02));
        assert!(MarketIndicators::is_near_support(101.0, 100.0, 0.02));
        assert!(!MarketIndicators::is_near_support(102.0, 100.0, 0.02));
    }
}
