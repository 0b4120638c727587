use crate::config::UploadConfig;
use crate::model::{LoaderError, PricePoint};
use std::collections::BTreeMap;

/// Ascending, de-duplicated price series keyed by ticker.
pub type TickerSeries = BTreeMap<String, Vec<PricePoint>>;

#[async_trait::async_trait]
pub trait PriceLoader: Send + Sync {
    async fn load(&self, upload: &UploadConfig) -> Result<TickerSeries, LoaderError>;
}
