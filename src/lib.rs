//! Drop-and-rebound trading signals for daily stock closes.

pub mod analyzer;
pub mod config;
pub mod loader;
pub mod model;
pub mod normalizer;
pub mod pipeline;
pub mod storage;
pub mod utils;

pub use analyzer::{generate_signals, summarize, Analyzer, AnalyzerImpl};
pub use model::{PricePoint, Signal, SignalRecord, SummaryStats};
