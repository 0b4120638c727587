use crate::model::ConfigError;
use chrono::NaiveDate;
use serde::Deserialize;
use std::fs;

/// Thresholds of the drop-and-rebound rule set.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct RuleConfig {
    /// Daily change (percent) at or below which a day counts as a drop.
    pub drop_threshold_pct: f64,
    /// Days between a buy and its sell; also the profit lookahead.
    pub hold_days: usize,
    pub ma_window: usize,
    pub support_lookback: usize,
    /// Relative distance to the support level still counted as "near".
    pub support_tolerance: f64,
    pub weak_buy_min_confidence: u8,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            drop_threshold_pct: -3.0,
            hold_days: 5,
            ma_window: 5,
            support_lookback: 20,
            support_tolerance: 0.02,
            weak_buy_min_confidence: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    pub path: String,
    #[serde(default = "default_ticker_column")]
    pub ticker_column: String,
    #[serde(default = "default_date_column")]
    pub date_column: String,
    #[serde(default = "default_price_column")]
    pub price_column: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_database_path")]
    pub database_path: String,
    #[serde(default)]
    pub uploads: Vec<UploadConfig>,
    #[serde(default)]
    pub rules: RuleConfig,
    #[serde(default = "default_min_history_days")]
    pub min_history_days: usize,
    pub report: Option<ReportConfig>,
    #[serde(default = "default_recent_days")]
    pub recent_days: u32,
}

fn default_ticker_column() -> String {
    "ticker".into()
}

fn default_date_column() -> String {
    "date".into()
}

fn default_price_column() -> String {
    "close".into()
}

fn default_database_path() -> String {
    "stock_signals.db".into()
}

fn default_min_history_days() -> usize {
    6
}

fn default_recent_days() -> u32 {
    30
}

pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = serde_json::from_str(content)?;
    if let Some(report) = &config.report {
        if report.start_date > report.end_date {
            return Err(ConfigError::InvalidRange {
                start: report.start_date,
                end: report.end_date,
            });
        }
    }
    Ok(config)
}

pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}
