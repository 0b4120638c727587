use crate::model::{
    PricePoint, RecentData, Report, Signal, SignalRecord, StorageError, TickerReport,
};
use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

const SIGNAL_COLUMNS: &str =
    "date, signal, price_drop, expected_profit, confidence, close_price";

const REPORT_COLUMNS: &str = "id, title, generated_at, start_date, end_date, summary,
     total_signals, successful_buys, success_rate";

pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens the database at `db_path` (":memory:" for a throwaway one) and creates the schema.
    pub fn new(db_path: &str) -> Result<Self, StorageError> {
        let conn = Connection::open(db_path)?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS organisations (
                ticker TEXT PRIMARY KEY,
                name TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS stock_prices (
                ticker TEXT NOT NULL,
                date TEXT NOT NULL,
                close_price REAL NOT NULL,
                UNIQUE (ticker, date)
            );

            CREATE TABLE IF NOT EXISTS trading_signals (
                ticker TEXT NOT NULL,
                date TEXT NOT NULL,
                signal TEXT NOT NULL,
                price_drop REAL,
                expected_profit REAL,
                confidence INTEGER NOT NULL DEFAULT 0,
                close_price REAL NOT NULL,
                analysis_date TEXT NOT NULL,
                UNIQUE (ticker, date)
            );

            CREATE TABLE IF NOT EXISTS reports (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                generated_at TEXT NOT NULL,
                start_date TEXT NOT NULL,
                end_date TEXT NOT NULL,
                summary TEXT NOT NULL,
                total_signals INTEGER NOT NULL DEFAULT 0,
                successful_buys INTEGER NOT NULL DEFAULT 0,
                success_rate REAL NOT NULL DEFAULT 0
            );
            ",
        )?;

        Ok(Self { conn })
    }

    /// Registers a ticker if it is new. Returns true when a row was created.
    pub fn get_or_create_organisation(&self, ticker: &str) -> Result<bool, StorageError> {
        let created = self.conn.execute(
            "INSERT OR IGNORE INTO organisations (ticker, name, created_at) VALUES (?1, ?1, ?2)",
            params![ticker, Utc::now()],
        )?;
        Ok(created > 0)
    }

    pub fn list_tickers(&self) -> Result<Vec<String>, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT ticker FROM organisations ORDER BY ticker ASC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    /// Removes a ticker with all its prices and signals.
    pub fn delete_organisation(&self, ticker: &str) -> Result<bool, StorageError> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM stock_prices WHERE ticker = ?1", params![ticker])?;
        tx.execute("DELETE FROM trading_signals WHERE ticker = ?1", params![ticker])?;
        let removed = tx.execute("DELETE FROM organisations WHERE ticker = ?1", params![ticker])?;
        tx.commit()?;
        Ok(removed > 0)
    }

    /// Inserts prices, skipping dates already stored for the ticker.
    /// Returns the number of rows actually inserted.
    pub fn save_prices(&self, ticker: &str, prices: &[PricePoint]) -> Result<usize, StorageError> {
        let tx = self.conn.unchecked_transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO stock_prices (ticker, date, close_price) VALUES (?1, ?2, ?3)",
            )?;
            for price in prices {
                inserted += stmt.execute(params![ticker, price.date, price.close_price])?;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    /// Full price history of a ticker, oldest first.
    pub fn load_prices(&self, ticker: &str) -> Result<Vec<PricePoint>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT date, close_price FROM stock_prices WHERE ticker = ?1 ORDER BY date ASC",
        )?;
        let rows = stmt.query_map(params![ticker], Self::map_price)?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    pub fn count_prices(&self) -> Result<usize, StorageError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM stock_prices", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Inserts signals, keeping any signal already stored for the same day.
    pub fn save_signals(
        &self,
        ticker: &str,
        signals: &[SignalRecord],
    ) -> Result<usize, StorageError> {
        let analysis_date = Utc::now();
        let tx = self.conn.unchecked_transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO trading_signals (
                    ticker, date, signal, price_drop, expected_profit,
                    confidence, close_price, analysis_date
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            for s in signals {
                inserted += stmt.execute(params![
                    ticker,
                    s.date,
                    s.signal.as_str(),
                    s.price_drop,
                    s.expected_profit,
                    s.confidence,
                    s.close_price,
                    analysis_date,
                ])?;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    /// Stored signals of a ticker dated within `[start, end]`, oldest first.
    pub fn signals_in_range(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<SignalRecord>, StorageError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM trading_signals
             WHERE ticker = ?1 AND date >= ?2 AND date <= ?3
             ORDER BY date ASC",
            SIGNAL_COLUMNS
        ))?;
        let rows = stmt.query_map(params![ticker, start, end], |row| Self::map_signal(row, 0))?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    pub fn count_signals_of(&self, signal: Signal) -> Result<usize, StorageError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM trading_signals WHERE signal = ?1",
            params![signal.as_str()],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Latest signals across all tickers, newest first.
    pub fn recent_signals(&self, limit: usize) -> Result<Vec<(String, SignalRecord)>, StorageError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT ticker, {} FROM trading_signals
             ORDER BY date DESC, ticker ASC LIMIT ?1",
            SIGNAL_COLUMNS
        ))?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok((row.get::<_, String>(0)?, Self::map_signal(row, 1)?))
        })?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    /// Prices and signals of a ticker dated within `[start, end]`.
    pub fn recent_data(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<RecentData, StorageError> {
        Ok(RecentData {
            prices: self.prices_between(ticker, start, end)?,
            signals: self.signals_in_range(ticker, start, end)?,
        })
    }

    /// Persists a report and returns its id.
    pub fn save_report(&self, report: &Report) -> Result<i64, StorageError> {
        let summary = serde_json::to_string(&report.summary)?;
        self.conn.execute(
            "INSERT INTO reports (
                title, generated_at, start_date, end_date, summary,
                total_signals, successful_buys, success_rate
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                &report.title,
                report.generated_at,
                report.start_date,
                report.end_date,
                summary,
                report.total_signals as i64,
                report.successful_buys as i64,
                report.success_rate,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_report(&self, id: i64) -> Result<Option<Report>, StorageError> {
        let report = self
            .conn
            .query_row(
                &format!("SELECT {} FROM reports WHERE id = ?1", REPORT_COLUMNS),
                params![id],
                Self::map_report,
            )
            .optional()?;
        Ok(report)
    }

    /// All reports, newest first.
    pub fn list_reports(&self) -> Result<Vec<Report>, StorageError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM reports ORDER BY generated_at DESC, id DESC",
            REPORT_COLUMNS
        ))?;
        let rows = stmt.query_map([], Self::map_report)?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    fn prices_between(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PricePoint>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT date, close_price FROM stock_prices
             WHERE ticker = ?1 AND date >= ?2 AND date <= ?3
             ORDER BY date ASC",
        )?;
        let rows = stmt.query_map(params![ticker, start, end], Self::map_price)?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    fn map_price(row: &Row) -> Result<PricePoint, rusqlite::Error> {
        Ok(PricePoint::new(row.get(0)?, row.get(1)?))
    }

    /// Maps the `SIGNAL_COLUMNS` starting at column `offset`.
    fn map_signal(row: &Row, offset: usize) -> Result<SignalRecord, rusqlite::Error> {
        let signal_str: String = row.get(offset + 1)?;
        let signal = Signal::parse(&signal_str).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                offset + 1,
                rusqlite::types::Type::Text,
                Box::new(StorageError::InvalidValue(format!("unknown signal '{}'", signal_str))),
            )
        })?;

        Ok(SignalRecord {
            date: row.get(offset)?,
            signal,
            price_drop: row.get(offset + 2)?,
            expected_profit: row.get(offset + 3)?,
            confidence: row.get(offset + 4)?,
            close_price: row.get(offset + 5)?,
        })
    }

    fn map_report(row: &Row) -> Result<Report, rusqlite::Error> {
        let summary_json: String = row.get(5)?;
        let summary: Vec<TickerReport> = serde_json::from_str(&summary_json).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
        })?;

        Ok(Report {
            id: Some(row.get(0)?),
            title: row.get(1)?,
            generated_at: row.get(2)?,
            start_date: row.get(3)?,
            end_date: row.get(4)?,
            summary,
            total_signals: row.get::<_, i64>(6)? as usize,
            successful_buys: row.get::<_, i64>(7)? as usize,
            success_rate: row.get(8)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::report::build_report;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn storage() -> SqliteStorage {
        SqliteStorage::new(":memory:").unwrap()
    }

    fn signal(d: u32, kind: Signal, drop: Option<f64>, profit: Option<f64>) -> SignalRecord {
        SignalRecord {
            date: day(d),
            signal: kind,
            price_drop: drop,
            expected_profit: profit,
            confidence: 65,
            close_price: 10.0 + d as f64,
        }
    }

    #[test]
    fn organisation_is_created_once() {
        let db = storage();
        assert!(db.get_or_create_organisation("AAA").unwrap());
        assert!(!db.get_or_create_organisation("AAA").unwrap());
        assert!(db.get_or_create_organisation("BBB").unwrap());
        assert_eq!(db.list_tickers().unwrap(), vec!["AAA", "BBB"]);
    }

    #[test]
    fn prices_ignore_duplicate_dates() {
        let db = storage();
        db.get_or_create_organisation("AAA").unwrap();
        let first = vec![PricePoint::new(day(2), 2.0), PricePoint::new(day(1), 1.0)];
        assert_eq!(db.save_prices("AAA", &first).unwrap(), 2);

        let second = vec![PricePoint::new(day(2), 20.0), PricePoint::new(day(3), 3.0)];
        assert_eq!(db.save_prices("AAA", &second).unwrap(), 1);

        assert_eq!(
            db.load_prices("AAA").unwrap(),
            vec![
                PricePoint::new(day(1), 1.0),
                PricePoint::new(day(2), 2.0),
                PricePoint::new(day(3), 3.0),
            ]
        );
        assert_eq!(db.count_prices().unwrap(), 3);
        assert!(db.load_prices("BBB").unwrap().is_empty());
    }

    #[test]
    fn signals_round_trip_with_nulls() {
        let db = storage();
        let signals = vec![
            signal(1, Signal::Hold, None, None),
            signal(2, Signal::Buy, Some(4.5), Some(2.25)),
            signal(3, Signal::WeakBuy, None, None),
            signal(7, Signal::Sell, Some(4.5), Some(-1.0)),
        ];
        assert_eq!(db.save_signals("AAA", &signals).unwrap(), 4);
        assert_eq!(db.save_signals("AAA", &signals).unwrap(), 0);

        assert_eq!(db.signals_in_range("AAA", day(1), day(31)).unwrap(), signals);
        assert_eq!(db.signals_in_range("AAA", day(2), day(3)).unwrap(), signals[1..3].to_vec());
        assert_eq!(db.count_signals_of(Signal::Buy).unwrap(), 1);
        assert_eq!(db.count_signals_of(Signal::Hold).unwrap(), 1);
    }

    #[test]
    fn recent_signals_are_newest_first() {
        let db = storage();
        db.save_signals("AAA", &[signal(1, Signal::Hold, None, None)]).unwrap();
        db.save_signals("BBB", &[signal(5, Signal::Buy, Some(3.0), Some(1.0))]).unwrap();
        let recent = db.recent_signals(10).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].0, "BBB");
        assert_eq!(recent[1].1.date, day(1));
        assert_eq!(db.recent_signals(1).unwrap().len(), 1);
    }

    #[test]
    fn recent_data_is_limited_to_window() {
        let db = storage();
        let prices: Vec<PricePoint> = (1..=10).map(|d| PricePoint::new(day(d), d as f64)).collect();
        db.save_prices("AAA", &prices).unwrap();
        db.save_signals("AAA", &[signal(2, Signal::Hold, None, None), signal(9, Signal::Hold, None, None)])
            .unwrap();

        let data = db.recent_data("AAA", day(8), day(10)).unwrap();
        assert_eq!(data.prices.len(), 3);
        assert_eq!(data.signals.len(), 1);
        assert_eq!(data.signals[0].date, day(9));
    }

    #[test]
    fn delete_removes_prices_and_signals() {
        let db = storage();
        db.get_or_create_organisation("AAA").unwrap();
        db.save_prices("AAA", &[PricePoint::new(day(1), 1.0)]).unwrap();
        db.save_signals("AAA", &[signal(1, Signal::Hold, None, None)]).unwrap();

        assert!(db.delete_organisation("AAA").unwrap());
        assert!(!db.delete_organisation("AAA").unwrap());
        assert!(db.list_tickers().unwrap().is_empty());
        assert_eq!(db.count_prices().unwrap(), 0);
        assert!(db.signals_in_range("AAA", day(1), day(31)).unwrap().is_empty());
    }

    #[test]
    fn reports_are_stored_and_listed() {
        let db = storage();
        let per_ticker = vec![(
            "AAA".to_string(),
            vec![signal(2, Signal::Buy, Some(4.0), Some(2.0)), signal(3, Signal::Buy, Some(3.0), Some(-1.0))],
        )];
        let report = build_report(None, day(1), day(31), &per_ticker);
        let id = db.save_report(&report).unwrap();

        let stored = db.get_report(id).unwrap().unwrap();
        assert_eq!(stored.id, Some(id));
        assert_eq!(stored.title, report.title);
        assert_eq!(stored.summary, report.summary);
        assert_eq!(stored.success_rate, 50.0);
        assert_eq!(stored.start_date, day(1));

        let second = db.save_report(&build_report(Some("again".into()), day(1), day(2), &per_ticker)).unwrap();
        let listed = db.list_reports().unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, Some(second));
        assert!(db.get_report(999).unwrap().is_none());
    }
}
