//! Memoized market analysis keyed by ticker and horizon
//!
//! Fetching and estimating is the slow part of a planning session; the
//! projection itself is cheap. Analyses are kept until explicitly invalidated.

use std::collections::HashMap;

use log::{debug, info};

use super::{DividendEvent, MarketDataProvider, MarketSnapshot};
use crate::error::{PlannerError, Result};
use crate::estimation::{
    build_payout_schedule, estimate_growth, trailing_annual_dividend, GrowthEstimate,
    PayoutFrequency, PayoutSchedule,
};

/// Number of most recent dividend events kept for display
const RECENT_DIVIDEND_COUNT: usize = 12;

/// Cache key: one analysis per ticker and requested horizon
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub ticker: String,
    pub horizon_years: u32,
}

impl CacheKey {
    pub fn new(ticker: &str, horizon_years: u32) -> Self {
        Self {
            ticker: ticker.trim().to_uppercase(),
            horizon_years,
        }
    }
}

/// Everything derived from the provider for one ticker and horizon
#[derive(Debug, Clone)]
pub struct MarketAnalysis {
    pub ticker: String,
    pub horizon_years: u32,

    /// Local-currency snapshot carrying the estimated growth rate
    pub snapshot: MarketSnapshot,

    pub growth: GrowthEstimate,

    /// Latest close in the trading currency
    pub latest_close: f64,

    /// Full dividend history in the trading currency
    pub dividends: Vec<DividendEvent>,
}

impl MarketAnalysis {
    /// Payout schedule for `frequency`, in the local currency
    pub fn schedule(&self, frequency: PayoutFrequency) -> Result<PayoutSchedule> {
        build_payout_schedule(
            &self.dividends,
            frequency,
            self.snapshot.unit_price_local(),
            self.snapshot.currency_rate(),
        )
    }

    /// Most recent dividend events, newest first
    pub fn recent_dividends(&self) -> Vec<DividendEvent> {
        self.dividends
            .iter()
            .rev()
            .take(RECENT_DIVIDEND_COUNT)
            .copied()
            .collect()
    }
}

/// Storage for analyses with hit/miss statistics
#[derive(Debug, Default)]
pub struct AnalysisCache {
    entries: HashMap<CacheKey, MarketAnalysis>,

    pub cache_hits: u64,
    pub cache_misses: u64,
}

impl AnalysisCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &CacheKey) -> Option<&MarketAnalysis> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, analysis: MarketAnalysis) {
        let key = CacheKey::new(&analysis.ticker, analysis.horizon_years);
        self.entries.insert(key, analysis);
    }

    /// Drop one entry; returns whether it was present
    pub fn invalidate(&mut self, key: &CacheKey) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Drop every horizon cached for `ticker`; returns the number removed
    pub fn invalidate_ticker(&mut self, ticker: &str) -> usize {
        let ticker = ticker.trim().to_uppercase();
        let before = self.entries.len();
        self.entries.retain(|key, _| key.ticker != ticker);
        before - self.entries.len()
    }

    /// Clear all cached data and statistics
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cache_hits = 0;
        self.cache_misses = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            0.0
        } else {
            self.cache_hits as f64 / total as f64
        }
    }
}

/// Fetches and analyzes market data through a provider, memoizing per key
#[derive(Debug)]
pub struct MarketAnalyzer<P> {
    provider: P,
    cache: AnalysisCache,
}

impl<P: MarketDataProvider> MarketAnalyzer<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            cache: AnalysisCache::new(),
        }
    }

    /// Analysis for `ticker` over the last `horizon_years`, fetched on first use
    pub fn analyze(&mut self, ticker: &str, horizon_years: u32) -> Result<MarketAnalysis> {
        let key = CacheKey::new(ticker, horizon_years);
        if let Some(cached) = self.cache.get(&key) {
            let analysis = cached.clone();
            self.cache.cache_hits += 1;
            debug!("cache hit for {} / {}y", key.ticker, key.horizon_years);
            return Ok(analysis);
        }

        self.cache.cache_misses += 1;
        info!("fetching market data for {} / {}y", key.ticker, key.horizon_years);
        let analysis = self.fetch(&key)?;
        self.cache.insert(analysis.clone());
        Ok(analysis)
    }

    fn fetch(&self, key: &CacheKey) -> Result<MarketAnalysis> {
        let history = self.provider.price_history(&key.ticker)?;
        let latest_close = history
            .last()
            .map(|s| s.close)
            .ok_or_else(|| PlannerError::provider(format!("no price history for {}", key.ticker)))?;

        let growth = estimate_growth(&history, key.horizon_years)?;
        let dividends = self.provider.dividend_events(&key.ticker)?;
        let currency_rate = self.provider.currency_rate()?;

        // Snapshot dividend is the trailing annual amount, as a monthly schedule would report it
        let annual_dividend = trailing_annual_dividend(&dividends);
        let snapshot = MarketSnapshot::from_foreign(
            latest_close,
            annual_dividend,
            round_rate(growth.growth_rate_per_period),
            currency_rate,
        )?;

        Ok(MarketAnalysis {
            ticker: key.ticker.clone(),
            horizon_years: key.horizon_years,
            snapshot,
            growth,
            latest_close,
            dividends,
        })
    }

    /// Forget the analysis for one ticker and horizon
    pub fn invalidate(&mut self, ticker: &str, horizon_years: u32) -> bool {
        self.cache.invalidate(&CacheKey::new(ticker, horizon_years))
    }

    /// Forget every analysis for `ticker`
    pub fn invalidate_ticker(&mut self, ticker: &str) -> usize {
        self.cache.invalidate_ticker(ticker)
    }

    /// Forget everything (the "refresh data" action)
    pub fn clear(&mut self) {
        self.cache.clear();
    }

    pub fn cache(&self) -> &AnalysisCache {
        &self.cache
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}

/// Trend as the simulation uses it: percent rounded to two decimals
fn round_rate(percent: f64) -> f64 {
    (percent * 100.0).round() / 100.0
}
