//! Core projection engine for monthly dividend reinvestment projections

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::cashflows::{CashflowRow, ProjectionResult};
use super::state::SimulationState;
use crate::error::{PlannerError, Result};
use crate::estimation::PayoutSchedule;
use crate::market::MarketSnapshot;

/// Longest supported projection (10 years)
pub const MAX_HORIZON_MONTHS: u32 = 120;

/// Configuration for a projection run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionConfig {
    /// Capital invested at month 0
    pub initial_capital: f64,

    /// External contribution invested at the end of every month
    pub monthly_contribution: f64,

    /// Fraction of gross dividends withheld as tax (0.15 = 15%)
    pub tax_rate: f64,

    /// Number of months to project
    pub horizon_months: u32,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            initial_capital: 10_000_000.0,
            monthly_contribution: 500_000.0,
            tax_rate: 0.15,
            horizon_months: 36, // 3 years
        }
    }
}

impl ProjectionConfig {
    /// Reject inputs that would make the simulation meaningless
    pub fn validate(&self) -> Result<()> {
        if self.horizon_months == 0 || self.horizon_months > MAX_HORIZON_MONTHS {
            return Err(PlannerError::precondition(format!(
                "horizon must be between 1 and {} months, got {}",
                MAX_HORIZON_MONTHS, self.horizon_months
            )));
        }
        if !(0.0..=1.0).contains(&self.tax_rate) {
            return Err(PlannerError::precondition(format!(
                "tax rate must be within [0, 1], got {}",
                self.tax_rate
            )));
        }
        if !self.initial_capital.is_finite() || self.initial_capital < 0.0 {
            return Err(PlannerError::precondition(format!(
                "initial capital must be non-negative, got {}",
                self.initial_capital
            )));
        }
        if !self.monthly_contribution.is_finite() || self.monthly_contribution < 0.0 {
            return Err(PlannerError::precondition(format!(
                "monthly contribution must be non-negative, got {}",
                self.monthly_contribution
            )));
        }
        Ok(())
    }
}

/// Main projection engine
#[derive(Debug, Clone)]
pub struct ProjectionEngine {
    config: ProjectionConfig,
}

impl ProjectionEngine {
    pub fn new(config: ProjectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Run the month-by-month reinvestment simulation
    pub fn project(
        &self,
        snapshot: &MarketSnapshot,
        schedule: &PayoutSchedule,
    ) -> Result<ProjectionResult> {
        self.config.validate()?;

        let mut state =
            SimulationState::new(self.config.initial_capital, snapshot.unit_price_local())?;
        let mut result = ProjectionResult::new(
            state.asset_value().trunc(),
            state.total_invested,
            self.config.horizon_months,
        );

        for _month in 1..=self.config.horizon_months {
            state.advance_month();
            let row = self.simulate_month(snapshot, schedule, &mut state)?;
            result.add_row(row);
        }
        result.break_even_month = state.break_even_month;

        info!(
            "projected {} months: asset {:.0}, invested {:.0}, break-even {:?}",
            self.config.horizon_months,
            result.final_asset(),
            result.final_invested(),
            result.break_even_month
        );

        Ok(result)
    }

    /// Apply one month's transition. The step order is fixed:
    /// dividend on pre-growth shares, break-even check before the contribution,
    /// growth, purchase at the post-growth price, then the contribution is booked.
    fn simulate_month(
        &self,
        snapshot: &MarketSnapshot,
        schedule: &PayoutSchedule,
        state: &mut SimulationState,
    ) -> Result<CashflowRow> {
        let contribution = self.config.monthly_contribution;

        let gross_dividend = state.shares_held * schedule.payout_for_month(state.month_index);
        let net_dividend = gross_dividend * (1.0 - self.config.tax_rate);
        state.accumulated_net_dividends += net_dividend;

        if state.check_break_even() {
            debug!(
                "break-even in month {}: dividends {:.0} >= invested {:.0}",
                state.month_index, state.accumulated_net_dividends, state.total_invested
            );
        }

        state.apply_growth(snapshot.growth_rate_per_period());
        let shares_bought = state.buy(net_dividend + contribution)?;
        state.total_invested += contribution;

        Ok(CashflowRow {
            month: state.month_index,
            unit_price: state.unit_price,
            shares_held: state.shares_held,
            gross_dividend,
            net_dividend,
            accumulated_net_dividends: state.accumulated_net_dividends,
            contribution,
            shares_bought,
            total_invested: state.total_invested,
            asset_value: state.asset_value().trunc(),
        })
    }
}

/// Run a projection with explicit arguments
pub fn project(
    initial_capital: f64,
    monthly_contribution: f64,
    snapshot: &MarketSnapshot,
    schedule: &PayoutSchedule,
    tax_rate: f64,
    horizon_months: u32,
) -> Result<ProjectionResult> {
    let config = ProjectionConfig {
        initial_capital,
        monthly_contribution,
        tax_rate,
        horizon_months,
    };
    ProjectionEngine::new(config).project(snapshot, schedule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimation::PayoutFrequency;
    use approx::assert_relative_eq;

    fn snapshot(price: f64, growth: f64) -> MarketSnapshot {
        MarketSnapshot::new(price, 1_800.0, growth, 1.0).unwrap()
    }

    fn monthly(per_payout: f64) -> PayoutSchedule {
        PayoutSchedule::from_per_payout(PayoutFrequency::Monthly, per_payout).unwrap()
    }

    #[test]
    fn test_reference_scenario() {
        let result = project(
            10_000_000.0,
            500_000.0,
            &snapshot(10_000.0, -1.0),
            &monthly(150.0),
            0.15,
            12,
        )
        .unwrap();

        let expected_assets = [
            10_000_000.0, 10_527_500.0, 11_057_806.0, 11_591_078.0, 12_127_477.0,
            12_667_170.0, 13_210_328.0, 13_757_126.0, 14_307_742.0, 14_862_362.0,
            15_421_173.0, 15_984_369.0, 16_552_150.0,
        ];
        assert_eq!(result.asset_series.len(), expected_assets.len());
        for (month, (actual, expected)) in
            result.asset_series.iter().zip(expected_assets).enumerate()
        {
            assert!(
                (actual - expected).abs() <= 1.0,
                "month {}: expected {}, got {}",
                month,
                expected,
                actual
            );
        }

        let expected_invested: Vec<f64> =
            (0..=12).map(|m| 10_000_000.0 + 500_000.0 * m as f64).collect();
        assert_eq!(result.invested_series, expected_invested);

        assert_eq!(result.break_even_month, None);
        assert_relative_eq!(result.accumulated_net_dividends, 2_107_291.586, epsilon = 0.01);

        let last = result.cashflows.last().unwrap();
        assert_relative_eq!(last.unit_price, 10_000.0 * 0.99f64.powi(12), max_relative = 1e-12);
    }

    #[test]
    fn test_first_month_detail() {
        let result = project(
            10_000_000.0,
            500_000.0,
            &snapshot(10_000.0, -1.0),
            &monthly(150.0),
            0.15,
            1,
        )
        .unwrap();
        let row = &result.cashflows[0];

        assert_relative_eq!(row.gross_dividend, 150_000.0);
        assert_relative_eq!(row.net_dividend, 127_500.0, epsilon = 1e-6);
        assert_relative_eq!(row.unit_price, 9_900.0, epsilon = 1e-9);
        assert_relative_eq!(row.shares_bought, 627_500.0 / 9_900.0, epsilon = 1e-9);
        assert_eq!(row.total_invested, 10_500_000.0);
    }

    #[test]
    fn test_series_lengths() {
        for months in [1, 7, 36, MAX_HORIZON_MONTHS] {
            let result =
                project(1_000.0, 10.0, &snapshot(50.0, 0.3), &monthly(0.4), 0.1, months).unwrap();
            assert_eq!(result.asset_series.len(), months as usize + 1);
            assert_eq!(result.invested_series.len(), months as usize + 1);
            assert_eq!(result.cashflows.len(), months as usize);
        }
    }

    #[test]
    fn test_invested_never_decreases_without_growth() {
        for tax_rate in [0.0, 0.15, 1.0] {
            let result =
                project(5_000.0, 250.0, &snapshot(20.0, 0.0), &monthly(0.2), tax_rate, 60).unwrap();
            assert!(result.invested_series.windows(2).all(|w| w[1] >= w[0]));
        }
    }

    #[test]
    fn test_break_even_is_first_qualifying_month() {
        // No contributions and a high yield: dividends overtake capital well before 10 years
        let result = project(
            10_000_000.0,
            0.0,
            &snapshot(10_000.0, -1.0),
            &monthly(150.0),
            0.15,
            120,
        )
        .unwrap();
        let m = result.break_even_month.expect("break-even within 10 years");
        assert_eq!(m, 52);

        // Replay: invested at the start of month k is invested_series[k - 1]
        for row in &result.cashflows {
            let invested_at_start = result.invested_series[row.month as usize - 1];
            let covered = row.accumulated_net_dividends >= invested_at_start;
            if row.month < m {
                assert!(!covered, "month {} already covered", row.month);
            } else if row.month == m {
                assert!(covered);
            }
        }
    }

    #[test]
    fn test_break_even_checked_before_contribution() {
        // Month 1 dividends equal the initial capital exactly; the month's
        // contribution must not count against it.
        let result = project(100.0, 50.0, &snapshot(1.0, 0.0), &monthly(1.0), 0.0, 3).unwrap();
        assert_eq!(result.break_even_month, Some(1));
    }

    #[test]
    fn test_payouts_only_on_interval_months() {
        let cases = [
            (PayoutFrequency::Quarterly, 3),
            (PayoutFrequency::Semiannual, 6),
            (PayoutFrequency::Annual, 12),
        ];
        for (frequency, interval) in cases {
            let schedule = PayoutSchedule::from_annual(frequency, 1_200.0).unwrap();
            let result =
                project(100_000.0, 1_000.0, &snapshot(10_000.0, 0.5), &schedule, 0.15, 48).unwrap();

            for row in &result.cashflows {
                if row.month % interval == 0 {
                    assert!(row.gross_dividend > 0.0, "{} month {}", frequency, row.month);
                } else {
                    assert_eq!(row.gross_dividend, 0.0, "{} month {}", frequency, row.month);
                    assert_eq!(row.net_dividend, 0.0);
                }
            }
            assert_eq!(result.summary().payout_months, 48 / interval);
        }
    }

    #[test]
    fn test_weekly_approximation_matches_monthly() {
        let weekly = PayoutSchedule::from_annual(PayoutFrequency::Weekly, 1_800.0).unwrap();
        let monthly = PayoutSchedule::from_annual(PayoutFrequency::Monthly, 1_800.0).unwrap();
        let snap = snapshot(10_000.0, -0.5);

        let a = project(1_000_000.0, 0.0, &snap, &weekly, 0.15, 24).unwrap();
        let b = project(1_000_000.0, 0.0, &snap, &monthly, 0.15, 24).unwrap();
        assert_eq!(a.asset_series, b.asset_series);
    }

    #[test]
    fn test_summary_decomposes_profit() {
        let snap = snapshot(10_000.0, -1.0);
        let result = project(1_000_000.0, 0.0, &snap, &monthly(150.0), 0.15, 24).unwrap();
        let summary = result.summary();

        assert_relative_eq!(summary.total_profit, summary.final_asset - summary.final_invested);
        assert_relative_eq!(summary.roi, summary.total_profit / summary.final_invested);
        assert_relative_eq!(
            summary.price_impact,
            summary.total_profit - summary.accumulated_net_dividends
        );
        // Falling price: dividends received exceed total profit
        assert!(summary.price_impact < 0.0);
    }

    #[test]
    fn test_zero_initial_capital_with_contributions() {
        let result = project(0.0, 1_000.0, &snapshot(100.0, 0.0), &monthly(1.0), 0.0, 2).unwrap();
        assert_eq!(result.asset_series[0], 0.0);
        // Month 1: 10 shares. Month 2: 10 * 1.0 dividend + 1000 buys 10.1 shares.
        assert_relative_eq!(result.cashflows[1].shares_held, 20.1, epsilon = 1e-9);
        assert_eq!(result.break_even_month, Some(1));
    }

    #[test]
    fn test_price_wiped_out_is_reported() {
        let snap = snapshot(10.0, -100.0);
        let err = project(1_000.0, 10.0, &snap, &monthly(0.1), 0.0, 12).unwrap_err();
        assert!(matches!(err, PlannerError::InvalidPrecondition(_)));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let snap = snapshot(10.0, 0.0);
        let schedule = monthly(0.1);

        assert!(project(1_000.0, 0.0, &snap, &schedule, 0.15, 0).is_err());
        assert!(project(1_000.0, 0.0, &snap, &schedule, 0.15, MAX_HORIZON_MONTHS + 1).is_err());
        assert!(project(1_000.0, 0.0, &snap, &schedule, 1.5, 12).is_err());
        assert!(project(1_000.0, -1.0, &snap, &schedule, 0.15, 12).is_err());
        assert!(project(f64::NAN, 0.0, &snap, &schedule, 0.15, 12).is_err());
    }
}
