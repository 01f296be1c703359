//! Market data consumed by the engine: price history, dividend events and the
//! point-in-time snapshot the projection and goal solver run against

mod snapshot;
mod cache;
pub mod loader;

pub use snapshot::MarketSnapshot;
pub use cache::{AnalysisCache, CacheKey, MarketAnalysis, MarketAnalyzer};
pub use loader::CsvMarketData;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One closing price observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceSample {
    pub date: NaiveDate,
    pub close: f64,
}

impl PriceSample {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// One dividend payment per share, in the security's trading currency
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DividendEvent {
    pub date: NaiveDate,
    pub amount: f64,
}

impl DividendEvent {
    pub fn new(date: NaiveDate, amount: f64) -> Self {
        Self { date, amount }
    }
}

/// Source of raw market data for a single ticker.
///
/// Implementations own retrieval and retries. Both series must be returned in
/// chronological order; the estimators reject anything else.
pub trait MarketDataProvider {
    /// Full available closing-price history
    fn price_history(&self, ticker: &str) -> Result<Vec<PriceSample>>;

    /// Full available dividend history
    fn dividend_events(&self, ticker: &str) -> Result<Vec<DividendEvent>>;

    /// Multiplier converting the trading currency into the local currency
    fn currency_rate(&self) -> Result<f64>;
}

impl<P: MarketDataProvider + ?Sized> MarketDataProvider for &P {
    fn price_history(&self, ticker: &str) -> Result<Vec<PriceSample>> {
        (**self).price_history(ticker)
    }

    fn dividend_events(&self, ticker: &str) -> Result<Vec<DividendEvent>> {
        (**self).dividend_events(ticker)
    }

    fn currency_rate(&self) -> Result<f64> {
        (**self).currency_rate()
    }
}
