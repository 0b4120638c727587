// Analyzer module: feature derivation, rule engine, summaries and reports.

pub mod features;
pub mod market_indicators;
pub mod price_analysis;
pub mod report;
pub mod summary;

// Re-export the main Analyzer implementation for ease of use.
pub use price_analysis::{Analyzer, AnalyzerImpl};
pub use summary::summarize;

use crate::model::{PricePoint, SignalRecord};

/// Runs the default rule set over one ticker's ascending price series.
pub fn generate_signals(ticker: &str, prices: &[PricePoint]) -> Vec<SignalRecord> {
    AnalyzerImpl::new().generate_signals(ticker, prices)
}
