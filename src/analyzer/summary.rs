use crate::model::{Signal, SignalRecord, SummaryStats};
use crate::utils::round2;

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Scores a list of signals: counts per kind, buy success rate and drop/profit averages.
///
/// Only `buy` feeds the rates and averages. `weak_buy` is not counted in any
/// bucket, so the three counts need not add up to `total_days`.
pub fn summarize(signals: &[SignalRecord]) -> SummaryStats {
    let count = |kind: Signal| signals.iter().filter(|s| s.signal == kind).count();
    let buys: Vec<&SignalRecord> = signals.iter().filter(|s| s.signal == Signal::Buy).collect();

    let total_buys = buys.len();
    let successful_buys = buys
        .iter()
        .filter(|s| s.expected_profit.is_some_and(|p| p > 0.0))
        .count();
    let success_rate = if total_buys > 0 {
        successful_buys as f64 / total_buys as f64 * 100.0
    } else {
        0.0
    };

    let drops: Vec<f64> = buys.iter().filter_map(|s| s.price_drop).collect();
    let profits: Vec<f64> = buys.iter().filter_map(|s| s.expected_profit).collect();

    let max_price_drop = drops.iter().copied().reduce(f64::max).unwrap_or(0.0);
    let min_price_drop = drops.iter().copied().reduce(f64::min).unwrap_or(0.0);

    SummaryStats {
        total_days: signals.len(),
        buy_signals: total_buys,
        sell_signals: count(Signal::Sell),
        hold_signals: count(Signal::Hold),
        success_rate: round2(success_rate),
        avg_price_drop: round2(mean(&drops)),
        avg_profit: round2(mean(&profits)),
        max_price_drop: round2(max_price_drop),
        min_price_drop: round2(min_price_drop),
    }
}
