//! Point-in-time market inputs for one ticker

use serde::Serialize;

use crate::error::{PlannerError, Result};

/// Price, dividend and trend inputs, already converted to the local currency.
///
/// Only constructible through [`MarketSnapshot::new`] so the engine never sees
/// a zero price or a non-finite value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarketSnapshot {
    unit_price_local: f64,
    annual_dividend_local: f64,
    growth_rate_per_period: f64,
    currency_rate: f64,
}

impl MarketSnapshot {
    /// Build a snapshot from local-currency values.
    ///
    /// `growth_rate_per_period` is a monthly percent change (e.g. `-1.0` for -1%/month).
    pub fn new(
        unit_price_local: f64,
        annual_dividend_local: f64,
        growth_rate_per_period: f64,
        currency_rate: f64,
    ) -> Result<Self> {
        if !unit_price_local.is_finite() || unit_price_local <= 0.0 {
            return Err(PlannerError::provider(format!(
                "unit price must be positive, got {}",
                unit_price_local
            )));
        }
        if !annual_dividend_local.is_finite() || annual_dividend_local < 0.0 {
            return Err(PlannerError::provider(format!(
                "annual dividend must be non-negative, got {}",
                annual_dividend_local
            )));
        }
        if !growth_rate_per_period.is_finite() {
            return Err(PlannerError::provider("growth rate is not a finite number"));
        }
        if !currency_rate.is_finite() || currency_rate <= 0.0 {
            return Err(PlannerError::provider(format!(
                "currency rate must be positive, got {}",
                currency_rate
            )));
        }

        Ok(Self {
            unit_price_local,
            annual_dividend_local,
            growth_rate_per_period,
            currency_rate,
        })
    }

    /// Build a snapshot from trading-currency values, converting with `currency_rate`
    pub fn from_foreign(
        unit_price: f64,
        annual_dividend: f64,
        growth_rate_per_period: f64,
        currency_rate: f64,
    ) -> Result<Self> {
        Self::new(
            unit_price * currency_rate,
            annual_dividend * currency_rate,
            growth_rate_per_period,
            currency_rate,
        )
    }

    /// Copy of this snapshot with a caller-chosen growth rate
    pub fn with_growth_rate(self, growth_rate_per_period: f64) -> Result<Self> {
        Self::new(
            self.unit_price_local,
            self.annual_dividend_local,
            growth_rate_per_period,
            self.currency_rate,
        )
    }

    pub fn unit_price_local(&self) -> f64 {
        self.unit_price_local
    }

    pub fn annual_dividend_local(&self) -> f64 {
        self.annual_dividend_local
    }

    /// Monthly percent change applied to price (and dividend, in the goal solver)
    pub fn growth_rate_per_period(&self) -> f64 {
        self.growth_rate_per_period
    }

    pub fn currency_rate(&self) -> f64 {
        self.currency_rate
    }

    /// Monthly-equivalent dividend per share
    pub fn monthly_dividend_local(&self) -> f64 {
        self.annual_dividend_local / 12.0
    }

    /// Trailing dividend yield as a fraction of the unit price
    pub fn annual_yield(&self) -> f64 {
        self.annual_dividend_local / self.unit_price_local
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rejects_zero_price() {
        let err = MarketSnapshot::new(0.0, 100.0, 0.5, 1.0).unwrap_err();
        assert!(matches!(err, PlannerError::ProviderFailure(_)));
    }

    #[test]
    fn test_rejects_non_finite_values() {
        assert!(MarketSnapshot::new(f64::NAN, 100.0, 0.5, 1.0).is_err());
        assert!(MarketSnapshot::new(100.0, f64::INFINITY, 0.5, 1.0).is_err());
        assert!(MarketSnapshot::new(100.0, 10.0, f64::NAN, 1.0).is_err());
        assert!(MarketSnapshot::new(100.0, 10.0, 0.5, 0.0).is_err());
        assert!(MarketSnapshot::new(100.0, -1.0, 0.5, 1.0).is_err());
    }

    #[test]
    fn test_foreign_values_are_converted() {
        let snapshot = MarketSnapshot::from_foreign(10.0, 1.2, -0.5, 1350.0).unwrap();
        assert_relative_eq!(snapshot.unit_price_local(), 13_500.0);
        assert_relative_eq!(snapshot.annual_dividend_local(), 1_620.0);
        assert_relative_eq!(snapshot.monthly_dividend_local(), 135.0);
        assert_relative_eq!(snapshot.annual_yield(), 0.12);
    }

    #[test]
    fn test_growth_override_keeps_prices() {
        let snapshot = MarketSnapshot::new(10_000.0, 1_800.0, -1.2, 1.0).unwrap();
        let overridden = snapshot.with_growth_rate(0.4).unwrap();
        assert_eq!(overridden.growth_rate_per_period(), 0.4);
        assert_eq!(overridden.unit_price_local(), 10_000.0);
        assert!(snapshot.with_growth_rate(f64::INFINITY).is_err());
    }
}
