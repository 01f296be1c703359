//! Load price history, dividend events and the currency rate from CSV files
//!
//! Layout of a data directory:
//! - `<TICKER>_prices.csv`    columns `date,close`
//! - `<TICKER>_dividends.csv` columns `date,amount` (optional, missing = no dividends)
//! - `fx.csv`                 columns `date,rate` (optional, missing = 1.0, last row wins)

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use csv::Reader;
use log::debug;

use super::{DividendEvent, MarketDataProvider, PriceSample};
use crate::error::{PlannerError, Result};

/// Default directory searched for market data files
pub const DEFAULT_DATA_PATH: &str = "data/market";

/// Raw CSV row of a price file
#[derive(Debug, serde::Deserialize)]
struct PriceRow {
    date: NaiveDate,
    close: f64,
}

/// Raw CSV row of a dividend file
#[derive(Debug, serde::Deserialize)]
struct DividendRow {
    date: NaiveDate,
    amount: f64,
}

/// Raw CSV row of the exchange-rate file
#[derive(Debug, serde::Deserialize)]
struct RateRow {
    #[serde(rename = "date")]
    _date: NaiveDate,
    rate: f64,
}

/// Load closing prices from any reader
pub fn load_prices_from_reader<R: Read>(reader: R) -> Result<Vec<PriceSample>> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut samples = Vec::new();

    for result in csv_reader.deserialize() {
        let row: PriceRow = result?;
        samples.push(PriceSample::new(row.date, row.close));
    }

    Ok(samples)
}

/// Load dividend events from any reader
pub fn load_dividends_from_reader<R: Read>(reader: R) -> Result<Vec<DividendEvent>> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut events = Vec::new();

    for result in csv_reader.deserialize() {
        let row: DividendRow = result?;
        events.push(DividendEvent::new(row.date, row.amount));
    }

    Ok(events)
}

/// Load the most recent exchange rate from any reader
pub fn load_rate_from_reader<R: Read>(reader: R) -> Result<f64> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut latest = None;

    for result in csv_reader.deserialize() {
        let row: RateRow = result?;
        latest = Some(row.rate);
    }

    latest.ok_or_else(|| PlannerError::provider("exchange-rate file has no rows"))
}

/// File-backed market data provider
#[derive(Debug, Clone)]
pub struct CsvMarketData {
    dir: PathBuf,
}

impl CsvMarketData {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Provider rooted at [`DEFAULT_DATA_PATH`]
    pub fn default_location() -> Self {
        Self::new(DEFAULT_DATA_PATH)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn ticker_file(&self, ticker: &str, suffix: &str) -> PathBuf {
        self.dir.join(format!("{}_{}.csv", ticker.to_uppercase(), suffix))
    }
}

impl MarketDataProvider for CsvMarketData {
    fn price_history(&self, ticker: &str) -> Result<Vec<PriceSample>> {
        let path = self.ticker_file(ticker, "prices");
        let file = File::open(&path).map_err(|e| {
            PlannerError::provider(format!("cannot open {}: {}", path.display(), e))
        })?;
        let samples = load_prices_from_reader(file)?;
        debug!("loaded {} price samples from {}", samples.len(), path.display());
        Ok(samples)
    }

    fn dividend_events(&self, ticker: &str) -> Result<Vec<DividendEvent>> {
        let path = self.ticker_file(ticker, "dividends");
        if !path.exists() {
            debug!("no dividend file at {}, assuming no dividends", path.display());
            return Ok(Vec::new());
        }
        let events = load_dividends_from_reader(File::open(&path)?)?;
        debug!("loaded {} dividend events from {}", events.len(), path.display());
        Ok(events)
    }

    fn currency_rate(&self) -> Result<f64> {
        let path = self.dir.join("fx.csv");
        if !path.exists() {
            return Ok(1.0);
        }
        load_rate_from_reader(File::open(&path)?)
    }
}
