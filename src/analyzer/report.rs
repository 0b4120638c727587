use crate::model::{Report, Signal, SignalRecord, TickerReport};
use crate::utils::round2;
use chrono::{NaiveDate, Utc};

pub fn default_title(start: NaiveDate, end: NaiveDate) -> String {
    format!("Stock Analysis Report {} to {}", start, end)
}

fn rate(successful: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round2(successful as f64 / total as f64 * 100.0)
}

/// Counts one ticker's signals dated within `[start, end]`.
pub fn ticker_report(
    ticker: &str,
    signals: &[SignalRecord],
    start: NaiveDate,
    end: NaiveDate,
) -> TickerReport {
    let in_range: Vec<&SignalRecord> = signals
        .iter()
        .filter(|s| s.date >= start && s.date <= end)
        .collect();

    let buy_signals = in_range.iter().filter(|s| s.signal == Signal::Buy).count();
    let sell_signals = in_range.iter().filter(|s| s.signal == Signal::Sell).count();
    let successful_buys = in_range
        .iter()
        .filter(|s| s.signal == Signal::Buy && s.expected_profit.is_some_and(|p| p > 0.0))
        .count();

    TickerReport {
        ticker: ticker.to_string(),
        total_signals: in_range.len(),
        buy_signals,
        sell_signals,
        successful_buys,
        success_rate: rate(successful_buys, buy_signals),
    }
}

/// Builds a cross-ticker report for the date range.
pub fn build_report(
    title: Option<String>,
    start: NaiveDate,
    end: NaiveDate,
    per_ticker: &[(String, Vec<SignalRecord>)],
) -> Report {
    let summary: Vec<TickerReport> = per_ticker
        .iter()
        .map(|(ticker, signals)| ticker_report(ticker, signals, start, end))
        .collect();

    let total_buys: usize = summary.iter().map(|t| t.buy_signals).sum();
    let successful_buys: usize = summary.iter().map(|t| t.successful_buys).sum();

    Report {
        id: None,
        title: title.unwrap_or_else(|| default_title(start, end)),
        generated_at: Utc::now(),
        start_date: start,
        end_date: end,
        total_signals: summary.iter().map(|t| t.total_signals).sum(),
        successful_buys,
        success_rate: rate(successful_buys, total_buys),
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn record(d: u32, signal: Signal, profit: Option<f64>) -> SignalRecord {
        SignalRecord {
            date: day(d),
            signal,
            price_drop: None,
            expected_profit: profit,
            confidence: 0,
            close_price: 1.0,
        }
    }

    #[test]
    fn range_is_inclusive() {
        let signals = vec![
            record(1, Signal::Buy, Some(1.0)),
            record(2, Signal::Buy, Some(-1.0)),
            record(3, Signal::Sell, Some(1.0)),
            record(4, Signal::Buy, Some(1.0)),
        ];
        let line = ticker_report("AAA", &signals, day(2), day(3));
        assert_eq!(line.total_signals, 2);
        assert_eq!(line.buy_signals, 1);
        assert_eq!(line.sell_signals, 1);
        assert_eq!(line.successful_buys, 0);
        assert_eq!(line.success_rate, 0.0);
    }

    #[test]
    fn overall_rate_weights_by_buy_count() {
        let per_ticker = vec![
            (
                "AAA".to_string(),
                vec![
                    record(1, Signal::Buy, Some(1.0)),
                    record(2, Signal::Buy, Some(2.0)),
                    record(3, Signal::Hold, None),
                ],
            ),
            (
                "BBB".to_string(),
                vec![record(1, Signal::Buy, Some(-1.0)), record(2, Signal::WeakBuy, None)],
            ),
            ("CCC".to_string(), vec![]),
        ];
        let report = build_report(None, day(1), day(31), &per_ticker);
        assert_eq!(report.title, "Stock Analysis Report 2024-01-01 to 2024-01-31");
        assert_eq!(report.summary.len(), 3);
        assert_eq!(report.summary[0].success_rate, 100.0);
        assert_eq!(report.summary[1].success_rate, 0.0);
        assert_eq!(report.summary[2].total_signals, 0);
        assert_eq!(report.total_signals, 5);
        assert_eq!(report.successful_buys, 2);
        assert_eq!(report.total_buys(), 3);
        assert_eq!(report.success_rate, 66.67);
    }
}
