// Core structs: PricePoint, SignalRecord, SummaryStats, Report
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// One daily close for a ticker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close_price: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close_price: f64) -> Self {
        Self { date, close_price }
    }
}

/// Per-day values derived from the price series, index-aligned with it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FeatureRow {
    pub prev_close: Option<f64>,
    pub daily_change_pct: Option<f64>,
    pub future_close_5d: Option<f64>,
    pub profit_pct_5d: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    Buy,
    WeakBuy,
    Hold,
    Sell,
}

impl Signal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::Buy => "buy",
            Signal::WeakBuy => "weak_buy",
            Signal::Hold => "hold",
            Signal::Sell => "sell",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "buy" => Some(Signal::Buy),
            "weak_buy" => Some(Signal::WeakBuy),
            "hold" => Some(Signal::Hold),
            "sell" => Some(Signal::Sell),
            _ => None,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recommendation for a single trading day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRecord {
    pub date: NaiveDate,
    pub signal: Signal,
    /// Magnitude of the qualifying daily drop, in percent.
    pub price_drop: Option<f64>,
    /// Forward 5-day profit for buys, realized profit for sells.
    pub expected_profit: Option<f64>,
    pub confidence: u8,
    pub close_price: f64,
}

impl SignalRecord {
    pub fn hold(date: NaiveDate, close_price: f64) -> Self {
        Self {
            date,
            signal: Signal::Hold,
            price_drop: None,
            expected_profit: None,
            confidence: 0,
            close_price,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SummaryStats {
    pub total_days: usize,
    pub buy_signals: usize,
    pub sell_signals: usize,
    pub hold_signals: usize,
    pub success_rate: f64,
    pub avg_price_drop: f64,
    pub avg_profit: f64,
    pub max_price_drop: f64,
    pub min_price_drop: f64,
}

/// Per-ticker line of a date-range report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerReport {
    pub ticker: String,
    pub total_signals: usize,
    pub buy_signals: usize,
    pub sell_signals: usize,
    pub successful_buys: usize,
    pub success_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: Option<i64>,
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub summary: Vec<TickerReport>,
    pub total_signals: usize,
    pub successful_buys: usize,
    pub success_rate: f64,
}

impl Report {
    pub fn total_buys(&self) -> usize {
        self.summary.iter().map(|t| t.buy_signals).sum()
    }
}

/// Prices and signals of one ticker inside a recent window, for charting.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RecentData {
    pub prices: Vec<PricePoint>,
    pub signals: Vec<SignalRecord>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("report start date {start} is after end date {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
}

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("failed to open price file: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("column '{0}' not found")]
    MissingColumn(String),
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),
    #[error("no usable price rows in {0}")]
    NoRows(String),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("invalid stored value: {0}")]
    InvalidValue(String),
    #[error("report summary encoding: {0}")]
    Encoding(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Loader(#[from] LoaderError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_names_match_stored_values() {
        for signal in [Signal::Buy, Signal::WeakBuy, Signal::Hold, Signal::Sell] {
            assert_eq!(Signal::parse(signal.as_str()), Some(signal));
        }
        assert_eq!(Signal::parse("strong_buy"), None);
        assert_eq!(serde_json::to_string(&Signal::WeakBuy).unwrap(), "\"weak_buy\"");
    }
}
