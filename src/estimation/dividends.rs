//! Dividend payout frequency and per-period payout amounts

use std::fmt;
use std::str::FromStr;

use chrono::Months;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, Result};
use crate::market::DividendEvent;

/// Cadence at which the simulated security pays dividends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayoutFrequency {
    /// ~52 payments a year, simulated as a monthly pro-rata payment
    Weekly,
    Monthly,
    Quarterly,
    Semiannual,
    Annual,
}

impl PayoutFrequency {
    pub const ALL: [PayoutFrequency; 5] = [
        PayoutFrequency::Weekly,
        PayoutFrequency::Monthly,
        PayoutFrequency::Quarterly,
        PayoutFrequency::Semiannual,
        PayoutFrequency::Annual,
    ];

    pub fn periods_per_year(self) -> u32 {
        match self {
            PayoutFrequency::Weekly => 52,
            PayoutFrequency::Monthly => 12,
            PayoutFrequency::Quarterly => 4,
            PayoutFrequency::Semiannual => 2,
            PayoutFrequency::Annual => 1,
        }
    }

    /// Months between payouts on the monthly simulation clock
    pub fn interval_months(self) -> u32 {
        match self {
            PayoutFrequency::Weekly | PayoutFrequency::Monthly => 1,
            PayoutFrequency::Quarterly => 3,
            PayoutFrequency::Semiannual => 6,
            PayoutFrequency::Annual => 12,
        }
    }

    /// Weekly payouts cannot be represented on a monthly clock
    pub fn is_approximated(self) -> bool {
        matches!(self, PayoutFrequency::Weekly)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PayoutFrequency::Weekly => "weekly",
            PayoutFrequency::Monthly => "monthly",
            PayoutFrequency::Quarterly => "quarterly",
            PayoutFrequency::Semiannual => "semiannual",
            PayoutFrequency::Annual => "annual",
        }
    }
}

impl fmt::Display for PayoutFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PayoutFrequency {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weekly" | "52" => Ok(PayoutFrequency::Weekly),
            "monthly" | "12" => Ok(PayoutFrequency::Monthly),
            "quarterly" | "4" => Ok(PayoutFrequency::Quarterly),
            "semiannual" | "semi-annual" | "2" => Ok(PayoutFrequency::Semiannual),
            "annual" | "yearly" | "1" => Ok(PayoutFrequency::Annual),
            other => Err(PlannerError::precondition(format!(
                "unknown payout frequency: {}",
                other
            ))),
        }
    }
}

/// Per-period payout amount and emission rule for the projection clock
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PayoutSchedule {
    pub frequency: PayoutFrequency,

    /// Nominal payouts per year (52 for weekly even though it is approximated)
    pub periods_per_year: u32,

    /// Months between simulated payouts
    pub interval_months: u32,

    /// True when weekly payouts are pro-rated onto the monthly clock
    pub approximation_mode: bool,

    /// Dividend per share paid on each emitting month, local currency
    pub per_payout_amount: f64,

    /// Trailing annual dividend per share, local currency
    pub annual_dividend_amount: f64,
}

impl PayoutSchedule {
    /// Schedule paying `annual_dividend_amount` per share per year at `frequency`
    pub fn from_annual(frequency: PayoutFrequency, annual_dividend_amount: f64) -> Result<Self> {
        if !annual_dividend_amount.is_finite() || annual_dividend_amount < 0.0 {
            return Err(PlannerError::provider(format!(
                "annual dividend must be non-negative, got {}",
                annual_dividend_amount
            )));
        }

        let approximation_mode = frequency.is_approximated();
        // Weekly is paid monthly, so it divides by 12 rather than 52
        let divisor = if approximation_mode {
            12.0
        } else {
            frequency.periods_per_year() as f64
        };

        Ok(Self {
            frequency,
            periods_per_year: frequency.periods_per_year(),
            interval_months: frequency.interval_months(),
            approximation_mode,
            per_payout_amount: annual_dividend_amount / divisor,
            annual_dividend_amount,
        })
    }

    /// Schedule paying a fixed `per_payout_amount` on each emitting month
    pub fn from_per_payout(frequency: PayoutFrequency, per_payout_amount: f64) -> Result<Self> {
        let payouts_per_year = if frequency.is_approximated() {
            12.0
        } else {
            frequency.periods_per_year() as f64
        };
        Self::from_annual(frequency, per_payout_amount * payouts_per_year)
    }

    /// Whether a dividend is paid in simulation month `month` (month 0 never pays)
    pub fn pays_in_month(&self, month: u32) -> bool {
        month > 0 && (self.approximation_mode || month % self.interval_months == 0)
    }

    /// Dividend per share paid in simulation month `month`
    pub fn payout_for_month(&self, month: u32) -> f64 {
        if self.pays_in_month(month) {
            self.per_payout_amount
        } else {
            0.0
        }
    }

    /// Trailing dividend yield at `unit_price`, as a fraction
    pub fn yield_on(&self, unit_price: f64) -> f64 {
        self.annual_dividend_amount / unit_price
    }
}

/// Sum of dividends paid in the 12 months ending at the latest event.
///
/// Falls back to `mean(all events) * 12` when that sum is zero. Returns 0 with no events.
pub fn trailing_annual_dividend(events: &[DividendEvent]) -> f64 {
    let Some(latest) = events.iter().map(|e| e.date).max() else {
        return 0.0;
    };

    let trailing: f64 = match latest.checked_sub_months(Months::new(12)) {
        Some(cutoff) => events
            .iter()
            .filter(|e| e.date > cutoff && e.date <= latest)
            .map(|e| e.amount)
            .sum(),
        None => events.iter().map(|e| e.amount).sum(),
    };

    if trailing > 0.0 {
        trailing
    } else {
        let mean = events.iter().map(|e| e.amount).sum::<f64>() / events.len() as f64;
        debug!("trailing dividends sum to zero, using mean of {} events", events.len());
        mean * 12.0
    }
}

/// Build the payout schedule for `frequency` from raw dividend events.
///
/// Event amounts are in the trading currency and converted with `currency_rate`.
pub fn build_payout_schedule(
    events: &[DividendEvent],
    frequency: PayoutFrequency,
    unit_price: f64,
    currency_rate: f64,
) -> Result<PayoutSchedule> {
    if !unit_price.is_finite() || unit_price <= 0.0 {
        return Err(PlannerError::precondition(format!(
            "unit price must be positive, got {}",
            unit_price
        )));
    }
    if !currency_rate.is_finite() || currency_rate <= 0.0 {
        return Err(PlannerError::provider(format!(
            "currency rate must be positive, got {}",
            currency_rate
        )));
    }
    if let Some(bad) = events.iter().find(|e| !e.amount.is_finite() || e.amount < 0.0) {
        return Err(PlannerError::provider(format!(
            "invalid dividend amount {} on {}",
            bad.amount, bad.date
        )));
    }
    if events.is_empty() {
        warn!("no dividend history, payouts will be zero");
    }

    let annual = trailing_annual_dividend(events) * currency_rate;
    let schedule = PayoutSchedule::from_annual(frequency, annual)?;

    debug!(
        "{} schedule: {:.4} per payout, {:.4} per year, yield {:.2}%",
        frequency,
        schedule.per_payout_amount,
        schedule.annual_dividend_amount,
        schedule.yield_on(unit_price) * 100.0
    );

    Ok(schedule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn event(y: i32, m: u32, d: u32, amount: f64) -> DividendEvent {
        DividendEvent::new(NaiveDate::from_ymd_opt(y, m, d).unwrap(), amount)
    }

    #[test]
    fn test_interval_times_periods_is_twelve() {
        for frequency in PayoutFrequency::ALL {
            let schedule = PayoutSchedule::from_annual(frequency, 120.0).unwrap();
            if schedule.approximation_mode {
                assert_eq!(frequency, PayoutFrequency::Weekly);
                assert_eq!(schedule.interval_months, 1);
            } else {
                assert_eq!(schedule.interval_months * schedule.periods_per_year, 12);
            }
        }
    }

    #[test]
    fn test_weekly_is_pro_rated_monthly() {
        let schedule = PayoutSchedule::from_annual(PayoutFrequency::Weekly, 1_200.0).unwrap();
        assert!(schedule.approximation_mode);
        assert_eq!(schedule.periods_per_year, 52);
        assert_relative_eq!(schedule.per_payout_amount, 100.0);
        assert!((1..=24).all(|m| schedule.pays_in_month(m)));
        assert!(!schedule.pays_in_month(0));
    }

    #[test]
    fn test_quarterly_emission() {
        let schedule = PayoutSchedule::from_annual(PayoutFrequency::Quarterly, 8.0).unwrap();
        assert_relative_eq!(schedule.per_payout_amount, 2.0);

        let paying: Vec<u32> = (0..=12).filter(|&m| schedule.pays_in_month(m)).collect();
        assert_eq!(paying, vec![3, 6, 9, 12]);
        assert_eq!(schedule.payout_for_month(4), 0.0);
        assert_eq!(schedule.payout_for_month(6), 2.0);
    }

    #[test]
    fn test_from_per_payout() {
        let monthly = PayoutSchedule::from_per_payout(PayoutFrequency::Monthly, 150.0).unwrap();
        assert_relative_eq!(monthly.annual_dividend_amount, 1_800.0);
        assert_relative_eq!(monthly.per_payout_amount, 150.0);

        let weekly = PayoutSchedule::from_per_payout(PayoutFrequency::Weekly, 150.0).unwrap();
        assert_relative_eq!(weekly.per_payout_amount, 150.0);
    }

    #[test]
    fn test_trailing_window_ends_at_latest_event() {
        let events = vec![
            event(2022, 6, 15, 9.0),
            event(2023, 3, 15, 1.0),
            event(2023, 6, 15, 1.0),
            event(2023, 9, 15, 1.0),
            event(2023, 12, 15, 1.0),
            event(2024, 3, 15, 2.0),
        ];
        // 2023-06 .. 2024-03 inclusive; 2023-03-15 sits exactly 12 months back and is excluded
        assert_relative_eq!(trailing_annual_dividend(&events), 5.0);
    }

    #[test]
    fn test_zero_trailing_sum_falls_back_to_mean() {
        let events = vec![
            event(2020, 1, 15, 3.0),
            event(2020, 2, 15, 1.0),
            event(2024, 1, 15, 0.0),
        ];
        assert_relative_eq!(trailing_annual_dividend(&events), (4.0 / 3.0) * 12.0);
        assert_eq!(trailing_annual_dividend(&[]), 0.0);
    }

    #[test]
    fn test_build_schedule_converts_currency() {
        let events: Vec<DividendEvent> = (1..=12).map(|m| event(2024, m, 10, 0.5)).collect();
        let schedule =
            build_payout_schedule(&events, PayoutFrequency::Monthly, 13_500.0, 1_350.0).unwrap();

        assert_relative_eq!(schedule.annual_dividend_amount, 6.0 * 1_350.0);
        assert_relative_eq!(schedule.per_payout_amount, 675.0);
        assert_relative_eq!(schedule.yield_on(13_500.0), 0.6);
    }

    #[test]
    fn test_build_schedule_rejects_bad_inputs() {
        let events = vec![event(2024, 1, 10, 0.5)];
        assert!(matches!(
            build_payout_schedule(&events, PayoutFrequency::Monthly, 0.0, 1.0),
            Err(PlannerError::InvalidPrecondition(_))
        ));
        assert!(matches!(
            build_payout_schedule(&[event(2024, 1, 10, -0.5)], PayoutFrequency::Monthly, 10.0, 1.0),
            Err(PlannerError::ProviderFailure(_))
        ));
        assert!(matches!(
            build_payout_schedule(&events, PayoutFrequency::Monthly, 10.0, 0.0),
            Err(PlannerError::ProviderFailure(_))
        ));
    }

    #[test]
    fn test_parse_frequency() {
        assert_eq!("Quarterly".parse::<PayoutFrequency>().unwrap(), PayoutFrequency::Quarterly);
        assert_eq!("52".parse::<PayoutFrequency>().unwrap(), PayoutFrequency::Weekly);
        assert!("fortnightly".parse::<PayoutFrequency>().is_err());
        for frequency in PayoutFrequency::ALL {
            assert_eq!(frequency.to_string().parse::<PayoutFrequency>().unwrap(), frequency);
        }
    }
}
