pub mod csv_loader;
pub mod traits;

pub use csv_loader::CsvPriceLoader;
pub use traits::{PriceLoader, TickerSeries};
