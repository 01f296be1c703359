//! Simulation state for a single reinvestment run

use crate::error::{PlannerError, Result};

/// Position held at a point in time during projection
#[derive(Debug, Clone)]
pub struct SimulationState {
    /// Current projection month (0 = start)
    pub month_index: u32,

    /// Shares held (fractional)
    pub shares_held: f64,

    /// Current unit price
    pub unit_price: f64,

    /// Capital contributed so far (initial capital plus contributions)
    pub total_invested: f64,

    /// Dividends received after tax, reinvested or not
    pub accumulated_net_dividends: f64,

    /// First month at which accumulated dividends covered total invested
    pub break_even_month: Option<u32>,
}

impl SimulationState {
    /// Initialize state by buying `initial_capital` worth of shares at `unit_price`
    pub fn new(initial_capital: f64, unit_price: f64) -> Result<Self> {
        if !unit_price.is_finite() || unit_price <= 0.0 {
            return Err(PlannerError::precondition(format!(
                "starting unit price must be positive, got {}",
                unit_price
            )));
        }

        Ok(Self {
            month_index: 0,
            shares_held: initial_capital / unit_price,
            unit_price,
            total_invested: initial_capital,
            accumulated_net_dividends: 0.0,
            break_even_month: None,
        })
    }

    /// Advance to next month
    pub fn advance_month(&mut self) {
        self.month_index += 1;
    }

    /// Market value of the position
    pub fn asset_value(&self) -> f64 {
        self.shares_held * self.unit_price
    }

    /// Record break-even if accumulated dividends cover what has been invested so far
    pub fn check_break_even(&mut self) -> bool {
        if self.break_even_month.is_none()
            && self.accumulated_net_dividends >= self.total_invested
        {
            self.break_even_month = Some(self.month_index);
            return true;
        }
        false
    }

    /// Apply one month of price growth (`growth_rate` in percent)
    pub fn apply_growth(&mut self, growth_rate: f64) {
        self.unit_price *= 1.0 + growth_rate / 100.0;
    }

    /// Buy shares with `amount` at the current price
    pub fn buy(&mut self, amount: f64) -> Result<f64> {
        if self.unit_price <= 0.0 || !self.unit_price.is_finite() {
            return Err(PlannerError::precondition(format!(
                "unit price fell to {} in month {}, cannot reinvest",
                self.unit_price, self.month_index
            )));
        }
        let new_shares = amount / self.unit_price;
        self.shares_held += new_shares;
        Ok(new_shares)
    }
}
