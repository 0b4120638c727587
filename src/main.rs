use stock_signals::analyzer::AnalyzerImpl;
use stock_signals::config::{load_config, AppConfig};
use stock_signals::loader::CsvPriceLoader;
use stock_signals::pipeline::{
    dashboard, generate_report, get_recent_data, process_all_tickers, process_upload, SharedStorage,
};
use stock_signals::storage::SqliteStorage;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Set panic hook to log details about any panic
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Panic occurred: {:?}", panic_info);
    }));

    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config.json".to_string());
    let config: AppConfig = match load_config(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Config load error ({}): {}", config_path, e);
            return;
        }
    };

    let storage: SharedStorage = match SqliteStorage::new(&config.database_path) {
        Ok(s) => Arc::new(Mutex::new(s)),
        Err(e) => {
            error!("Failed to initialize storage: {:?}", e);
            return;
        }
    };

    let loader = CsvPriceLoader::new();
    let analyzer = AnalyzerImpl::with_rules(config.rules.clone());

    info!("Uploads to process: {}", config.uploads.len());
    for upload in &config.uploads {
        if let Err(e) = process_upload(upload, &loader, storage.clone()).await {
            warn!("Upload {} failed: {}", upload.path, e);
        }
    }

    let processed =
        match process_all_tickers(&analyzer, storage.clone(), config.min_history_days).await {
            Ok(p) => p,
            Err(e) => {
                error!("Signal generation failed: {:?}", e);
                return;
            }
        };
    info!("Analyzed {} tickers", processed.len());

    if let Some(report_cfg) = &config.report {
        if let Err(e) = generate_report(storage.clone(), report_cfg).await {
            warn!("Report generation failed: {:?}", e);
        }
    }

    let today = chrono::Local::now().date_naive();
    for (ticker, _) in &processed {
        match get_recent_data(storage.clone(), ticker, config.recent_days, today).await {
            Ok(data) => info!(
                "{}: last {} days -> {} prices, {} signals",
                ticker,
                config.recent_days,
                data.prices.len(),
                data.signals.len()
            ),
            Err(e) => warn!("{}: recent data unavailable: {:?}", ticker, e),
        }
    }

    match dashboard(storage).await {
        Ok(d) => {
            info!(
                "Dashboard: {} organisations, {} prices, {} buy signals",
                d.total_organisations, d.total_prices, d.buy_signals_count
            );
            for (ticker, s) in &d.recent_signals {
                info!("  {} {} {} (confidence {})", s.date, ticker, s.signal, s.confidence);
            }
        }
        Err(e) => warn!("Dashboard unavailable: {:?}", e),
    }
}
