use crate::model::{FeatureRow, PricePoint};
use crate::utils::pct_change;

/// Derives previous close, daily change and forward profit for every day.
///
/// `lookahead` is the forward distance in days used for `future_close_5d`
/// and `profit_pct_5d`. Undefined values (first day, zero base price, past
/// the end of the series) are `None`.
pub fn build_features(prices: &[PricePoint], lookahead: usize) -> Vec<FeatureRow> {
    let n = prices.len();

    prices
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let close = point.close_price;
            let prev_close = i.checked_sub(1).map(|j| prices[j].close_price);
            let daily_change_pct = prev_close.and_then(|prev| pct_change(prev, close));
            let future_close_5d = i
                .checked_add(lookahead)
                .filter(|&j| j < n)
                .map(|j| prices[j].close_price);
            let profit_pct_5d = future_close_5d.and_then(|future| pct_change(close, future));

            FeatureRow {
                prev_close,
                daily_change_pct,
                future_close_5d,
                profit_pct_5d,
            }
        })
        .collect()
}
