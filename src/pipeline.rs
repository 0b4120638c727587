// Orchestration: upload ingestion, per-ticker signal runs, reports.
use crate::analyzer::report::build_report;
use crate::analyzer::{Analyzer, AnalyzerImpl};
use crate::config::{ReportConfig, UploadConfig};
use crate::loader::PriceLoader;
use crate::model::{AppError, RecentData, Report, Signal, SignalRecord, StorageError, SummaryStats};
use crate::storage::SqliteStorage;
use chrono::{Days, NaiveDate};
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

pub type SharedStorage = Arc<Mutex<SqliteStorage>>;

const DASHBOARD_RECENT_SIGNALS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UploadOutcome {
    pub organisations_created: usize,
    pub prices_created: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub total_organisations: usize,
    pub total_prices: usize,
    pub buy_signals_count: usize,
    pub recent_signals: Vec<(String, SignalRecord)>,
}

/// Loads one upload and stores its prices, registering unseen tickers.
pub async fn process_upload(
    upload: &UploadConfig,
    loader: &dyn PriceLoader,
    storage: SharedStorage,
) -> Result<UploadOutcome, AppError> {
    info!("Processing upload: {}", upload.path);
    let series = loader.load(upload).await?;

    let mut outcome = UploadOutcome::default();
    let guard = storage.lock().await;
    for (ticker, prices) in &series {
        if guard.get_or_create_organisation(ticker)? {
            outcome.organisations_created += 1;
        }
        outcome.prices_created += guard.save_prices(ticker, prices)?;
    }

    info!(
        "Upload {}: {} new organisations, {} new prices",
        upload.path, outcome.organisations_created, outcome.prices_created
    );
    Ok(outcome)
}

/// Runs the analyzer over a ticker's stored history and persists the signals.
/// Returns None when the history is shorter than `min_history_days`.
pub async fn process_ticker(
    ticker: &str,
    analyzer: &AnalyzerImpl,
    storage: SharedStorage,
    min_history_days: usize,
) -> Result<Option<SummaryStats>, StorageError> {
    let prices = storage.lock().await.load_prices(ticker)?;
    if prices.len() < min_history_days {
        warn!(
            "{}: insufficient data for analysis ({} days, need {})",
            ticker,
            prices.len(),
            min_history_days
        );
        return Ok(None);
    }

    let signals = analyzer.generate_signals(ticker, &prices);
    let stored = storage.lock().await.save_signals(ticker, &signals)?;
    let stats = analyzer.summarize(&signals);

    info!(
        "{}: {} days, {} new signals | buy {} sell {} hold {} | success {:.2}% avg drop {:.2}% avg profit {:.2}%",
        ticker,
        stats.total_days,
        stored,
        stats.buy_signals,
        stats.sell_signals,
        stats.hold_signals,
        stats.success_rate,
        stats.avg_price_drop,
        stats.avg_profit
    );
    Ok(Some(stats))
}

/// Processes every stored ticker concurrently. Failing tickers are logged and left out.
pub async fn process_all_tickers(
    analyzer: &AnalyzerImpl,
    storage: SharedStorage,
    min_history_days: usize,
) -> Result<Vec<(String, SummaryStats)>, StorageError> {
    let tickers = storage.lock().await.list_tickers()?;
    info!("Tickers to process: {}", tickers.len());

    let tasks = tickers.iter().map(|ticker| {
        let storage = storage.clone();
        async move {
            let result = process_ticker(ticker, analyzer, storage, min_history_days).await;
            (ticker, result)
        }
    });

    let mut processed = Vec::new();
    for (ticker, result) in join_all(tasks).await {
        match result {
            Ok(Some(stats)) => processed.push((ticker.clone(), stats)),
            Ok(None) => {}
            Err(e) => warn!("{}: signal generation failed: {:?}", ticker, e),
        }
    }
    Ok(processed)
}

/// Builds a cross-ticker report from stored signals and saves it.
pub async fn generate_report(
    storage: SharedStorage,
    cfg: &ReportConfig,
) -> Result<Report, StorageError> {
    let guard = storage.lock().await;
    let mut per_ticker = Vec::new();
    for ticker in guard.list_tickers()? {
        let signals = guard.signals_in_range(&ticker, cfg.start_date, cfg.end_date)?;
        per_ticker.push((ticker, signals));
    }

    let mut report = build_report(cfg.title.clone(), cfg.start_date, cfg.end_date, &per_ticker);
    report.id = Some(guard.save_report(&report)?);

    info!(
        "Report '{}': {} signals, {} of {} buys successful ({:.2}%)",
        report.title,
        report.total_signals,
        report.successful_buys,
        report.total_buys(),
        report.success_rate
    );
    Ok(report)
}

/// Prices and signals of the last `days` days up to `today`.
pub async fn get_recent_data(
    storage: SharedStorage,
    ticker: &str,
    days: u32,
    today: NaiveDate,
) -> Result<RecentData, StorageError> {
    let start = today
        .checked_sub_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MIN);
    storage.lock().await.recent_data(ticker, start, today)
}

pub async fn dashboard(storage: SharedStorage) -> Result<Dashboard, StorageError> {
    let guard = storage.lock().await;
    Ok(Dashboard {
        total_organisations: guard.list_tickers()?.len(),
        total_prices: guard.count_prices()?,
        buy_signals_count: guard.count_signals_of(Signal::Buy)?,
        recent_signals: guard.recent_signals(DASHBOARD_RECENT_SIGNALS)?,
    })
}
