//! Closed-form inverse of the projection: capital and level monthly
//! contribution needed to reach a target net income

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, Result};
use crate::estimation::PayoutSchedule;
use crate::market::MarketSnapshot;

/// Inputs of a goal solve besides the market snapshot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalConfig {
    /// Net (after-tax) income wanted every month at the end of the horizon
    pub target_monthly_income: f64,

    /// Fraction of gross dividends withheld as tax
    pub tax_rate: f64,

    /// Months until the income should start
    pub horizon_months: u32,
}

impl Default for GoalConfig {
    fn default() -> Self {
        Self {
            target_monthly_income: 1_000_000.0,
            tax_rate: 0.15,
            horizon_months: 36,
        }
    }
}

/// Capital and savings plan for a target income
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalPlan {
    /// Portfolio value needed at the end of the horizon
    pub required_future_capital: f64,

    /// Level monthly amount to invest, starting now
    pub required_monthly_contribution: f64,

    pub estimated_future_price: f64,

    /// Annual dividend per share at the end of the horizon
    pub estimated_future_dividend_per_share: f64,

    pub needed_shares: f64,

    /// Price trend plus monthly dividend yield, as a fraction
    pub total_monthly_return_rate: f64,

    pub target_annual_income: f64,
}

impl GoalPlan {
    /// Dividend per share each payout would pay at the end of the horizon
    pub fn future_per_payout_amount(&self, schedule: &PayoutSchedule) -> f64 {
        let payouts_per_year = if schedule.approximation_mode {
            12.0
        } else {
            schedule.periods_per_year as f64
        };
        self.estimated_future_dividend_per_share / payouts_per_year
    }
}

/// Goal-seeking annuity solver
#[derive(Debug, Clone)]
pub struct GoalSolver {
    config: GoalConfig,
}

impl GoalSolver {
    pub fn new(config: GoalConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GoalConfig {
        &self.config
    }

    /// Solve for the accumulation plan, starting from an empty position
    pub fn solve(&self, snapshot: &MarketSnapshot) -> Result<GoalPlan> {
        let GoalConfig {
            target_monthly_income,
            tax_rate,
            horizon_months,
        } = self.config;

        if horizon_months == 0 {
            return Err(PlannerError::precondition("goal horizon must be at least one month"));
        }
        if !(0.0..1.0).contains(&tax_rate) {
            return Err(PlannerError::precondition(format!(
                "tax rate must be within [0, 1), got {}",
                tax_rate
            )));
        }
        if !target_monthly_income.is_finite() || target_monthly_income < 0.0 {
            return Err(PlannerError::precondition(format!(
                "target income must be non-negative, got {}",
                target_monthly_income
            )));
        }

        let periods = i32::try_from(horizon_months).map_err(|_| {
            PlannerError::precondition(format!(
                "goal horizon of {} months is too long",
                horizon_months
            ))
        })?;

        let growth = snapshot.growth_rate_per_period() / 100.0;
        let price = snapshot.unit_price_local();
        let annual_dividend = snapshot.annual_dividend_local();

        // Below -100% the price would change sign every month
        if 1.0 + growth <= 0.0 {
            return Err(PlannerError::precondition(format!(
                "monthly trend of {:.2}% wipes out the price",
                snapshot.growth_rate_per_period()
            )));
        }

        let decay_factor = (1.0 + growth).powi(periods);
        let estimated_future_price = price * decay_factor;
        let estimated_future_dividend_per_share = annual_dividend * decay_factor;

        if estimated_future_dividend_per_share <= 0.0 {
            return Err(PlannerError::precondition(format!(
                "projected dividend per share after {} months is {:.4}; target unreachable",
                horizon_months, estimated_future_dividend_per_share
            )));
        }

        let target_annual_income = target_monthly_income * 12.0;
        let needed_shares =
            target_annual_income / (estimated_future_dividend_per_share * (1.0 - tax_rate));
        let required_future_capital = needed_shares * estimated_future_price;

        let monthly_yield_rate = (annual_dividend / 12.0) / price;
        let total_monthly_return_rate = growth + monthly_yield_rate;

        let required_monthly_contribution = if total_monthly_return_rate == 0.0 {
            required_future_capital / horizon_months as f64
        } else {
            required_future_capital * total_monthly_return_rate
                / ((1.0 + total_monthly_return_rate).powi(periods) - 1.0)
        };

        if !required_monthly_contribution.is_finite() || required_monthly_contribution < 0.0 {
            return Err(PlannerError::precondition(format!(
                "monthly return rate {:.6} yields no usable contribution ({})",
                total_monthly_return_rate, required_monthly_contribution
            )));
        }

        debug!(
            "goal: {:.2} shares, capital {:.0}, {:.0}/month at {:.4}%/month",
            needed_shares,
            required_future_capital,
            required_monthly_contribution,
            total_monthly_return_rate * 100.0
        );

        Ok(GoalPlan {
            required_future_capital,
            required_monthly_contribution,
            estimated_future_price,
            estimated_future_dividend_per_share,
            needed_shares,
            total_monthly_return_rate,
            target_annual_income,
        })
    }
}

/// Solve a goal with explicit arguments
pub fn solve_goal(
    snapshot: &MarketSnapshot,
    tax_rate: f64,
    horizon_months: u32,
    target_monthly_income: f64,
) -> Result<GoalPlan> {
    GoalSolver::new(GoalConfig {
        target_monthly_income,
        tax_rate,
        horizon_months,
    })
    .solve(snapshot)
}
