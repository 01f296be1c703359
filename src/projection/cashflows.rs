//! Output structures for projections

use serde::{Deserialize, Serialize};

/// A single row of projection output for one month
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashflowRow {
    pub month: u32,

    /// Unit price after this month's growth
    pub unit_price: f64,

    /// Shares held at end of month
    pub shares_held: f64,

    // Dividends
    pub gross_dividend: f64,
    pub net_dividend: f64,
    pub accumulated_net_dividends: f64,

    // Purchases
    pub contribution: f64,
    pub shares_bought: f64,

    pub total_invested: f64,

    /// End-of-month market value, truncated to whole currency units
    pub asset_value: f64,
}

/// Complete projection result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionResult {
    /// Asset value per month, index 0 = start (len = months + 1)
    pub asset_series: Vec<f64>,

    /// Capital invested per month, same indexing as `asset_series`
    pub invested_series: Vec<f64>,

    /// First month where accumulated net dividends covered capital invested
    pub break_even_month: Option<u32>,

    /// Total net dividends received over the run
    pub accumulated_net_dividends: f64,

    /// Detail rows for months 1..=horizon
    pub cashflows: Vec<CashflowRow>,
}

impl ProjectionResult {
    pub fn new(initial_asset: f64, initial_invested: f64, months: u32) -> Self {
        let capacity = months as usize + 1;
        let mut asset_series = Vec::with_capacity(capacity);
        let mut invested_series = Vec::with_capacity(capacity);
        asset_series.push(initial_asset);
        invested_series.push(initial_invested);

        Self {
            asset_series,
            invested_series,
            break_even_month: None,
            accumulated_net_dividends: 0.0,
            cashflows: Vec::with_capacity(months as usize),
        }
    }

    /// Add a month row and extend both series
    pub fn add_row(&mut self, row: CashflowRow) {
        self.asset_series.push(row.asset_value);
        self.invested_series.push(row.total_invested);
        self.accumulated_net_dividends = row.accumulated_net_dividends;
        self.cashflows.push(row);
    }

    pub fn months(&self) -> u32 {
        self.cashflows.len() as u32
    }

    pub fn final_asset(&self) -> f64 {
        self.asset_series.last().copied().unwrap_or(0.0)
    }

    pub fn final_invested(&self) -> f64 {
        self.invested_series.last().copied().unwrap_or(0.0)
    }

    /// Get summary statistics
    pub fn summary(&self) -> ProjectionSummary {
        let final_asset = self.final_asset();
        let final_invested = self.final_invested();
        let total_profit = final_asset - final_invested;
        let roi = if final_invested > 0.0 {
            total_profit / final_invested
        } else {
            0.0
        };
        let total_gross_dividends: f64 = self.cashflows.iter().map(|r| r.gross_dividend).sum();
        let payout_months = self.cashflows.iter().filter(|r| r.gross_dividend > 0.0).count() as u32;

        ProjectionSummary {
            total_months: self.months(),
            final_asset,
            final_invested,
            total_profit,
            roi,
            total_gross_dividends,
            accumulated_net_dividends: self.accumulated_net_dividends,
            price_impact: total_profit - self.accumulated_net_dividends,
            payout_months,
            break_even_month: self.break_even_month,
        }
    }
}

/// Summary statistics for a projection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionSummary {
    pub total_months: u32,
    pub final_asset: f64,
    pub final_invested: f64,
    pub total_profit: f64,

    /// Profit over final invested capital, as a fraction
    pub roi: f64,

    pub total_gross_dividends: f64,
    pub accumulated_net_dividends: f64,

    /// Profit not explained by dividends received, i.e. due to price movement
    pub price_impact: f64,

    pub payout_months: u32,
    pub break_even_month: Option<u32>,
}
