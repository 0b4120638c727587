// CSV price file loading
use crate::config::UploadConfig;
use crate::loader::traits::{PriceLoader, TickerSeries};
use crate::model::{LoaderError, PricePoint};
use crate::normalizer::{normalize_column, normalize_series, normalize_ticker};
use crate::utils::parse_date;
use csv::StringRecord;
use std::path::Path;
use tracing::{debug, info, warn};

pub struct CsvPriceLoader;

impl CsvPriceLoader {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CsvPriceLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn column_index(headers: &StringRecord, name: &str) -> Result<usize, LoaderError> {
    let wanted = normalize_column(name);
    headers
        .iter()
        .position(|h| normalize_column(h) == wanted)
        .ok_or(LoaderError::MissingColumn(wanted))
}

/// Parses CSV bytes into per-ticker series using the upload's column mapping.
///
/// Rows with an unparseable date are dropped; rows whose price is missing,
/// non-numeric or negative are dropped with a warning.
pub fn parse_prices(data: &[u8], upload: &UploadConfig) -> Result<TickerSeries, LoaderError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(data);

    let headers = reader.headers()?.clone();
    let ticker_idx = column_index(&headers, &upload.ticker_column)?;
    let date_idx = column_index(&headers, &upload.date_column)?;
    let price_idx = column_index(&headers, &upload.price_column)?;

    let mut series = TickerSeries::new();
    let mut bad_dates = 0usize;

    for (line, result) in reader.records().enumerate() {
        let record = result?;

        let ticker = normalize_ticker(record.get(ticker_idx).unwrap_or_default());
        if ticker.is_empty() {
            debug!("Row {}: empty ticker, skipped", line + 2);
            continue;
        }

        let Some(date) = record.get(date_idx).and_then(parse_date) else {
            bad_dates += 1;
            continue;
        };

        let raw_price = record.get(price_idx).unwrap_or_default();
        let close_price = match raw_price.parse::<f64>() {
            Ok(p) if p.is_finite() && p >= 0.0 => p,
            _ => {
                warn!("Row {}: invalid close price '{}' for {}", line + 2, raw_price, ticker);
                continue;
            }
        };

        series
            .entry(ticker)
            .or_default()
            .push(PricePoint::new(date, close_price));
    }

    if bad_dates > 0 {
        debug!("Dropped {} rows with unparseable dates", bad_dates);
    }

    for prices in series.values_mut() {
        normalize_series(prices);
    }

    Ok(series)
}

#[async_trait::async_trait]
impl PriceLoader for CsvPriceLoader {
    async fn load(&self, upload: &UploadConfig) -> Result<TickerSeries, LoaderError> {
        let path = Path::new(&upload.path);
        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
        if !is_csv {
            return Err(LoaderError::UnsupportedFormat(upload.path.clone()));
        }

        let data = tokio::fs::read(path).await?;
        let series = parse_prices(&data, upload)?;
        if series.is_empty() {
            return Err(LoaderError::NoRows(upload.path.clone()));
        }

        info!(
            "Loaded {} tickers ({} prices) from {}",
            series.len(),
            series.values().map(Vec::len).sum::<usize>(),
            upload.path
        );
        Ok(series)
    }
}
