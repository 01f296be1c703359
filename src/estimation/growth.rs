//! Mean month-over-month price change from a closing-price history

use chrono::{Datelike, Months, NaiveDate};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, Result};
use crate::market::PriceSample;

/// Fraction of the requested horizon the history must cover to be considered sufficient
pub const SUFFICIENCY_RATIO: f64 = 0.8;

const DAYS_PER_YEAR: f64 = 365.0;

/// Result of a growth estimation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowthEstimate {
    /// Mean monthly percent change (e.g. `-1.25` for -1.25%/month)
    pub growth_rate_per_period: f64,

    /// Whether the history covered less than 80% of the requested horizon
    pub data_insufficient: bool,

    /// Span of the history actually used, in years
    pub actual_years: f64,

    /// Horizon the caller asked for
    pub requested_years: u32,
}

impl GrowthEstimate {
    /// Non-fatal warning describing the shortfall, if any
    pub fn warning(&self) -> Option<PlannerError> {
        self.data_insufficient.then(|| PlannerError::InsufficientData {
            requested_years: self.requested_years,
            actual_years: self.actual_years,
        })
    }
}

/// Estimate the mean monthly growth rate over the last `requested_years` of `history`.
///
/// The history is resampled to the last close of each calendar month before
/// computing simple percent changes between consecutive months.
pub fn estimate_growth(history: &[PriceSample], requested_years: u32) -> Result<GrowthEstimate> {
    if requested_years == 0 {
        return Err(PlannerError::precondition("requested horizon must be at least one year"));
    }
    let window_months = requested_years.checked_mul(12).ok_or_else(|| {
        PlannerError::precondition(format!(
            "requested horizon of {} years is too long",
            requested_years
        ))
    })?;
    validate_history(history)?;

    let Some(latest) = history.last() else {
        warn!("empty price history, growth rate defaults to 0");
        return Ok(GrowthEstimate {
            growth_rate_per_period: 0.0,
            data_insufficient: true,
            actual_years: 0.0,
            requested_years,
        });
    };

    let window_start = latest
        .date
        .checked_sub_months(Months::new(window_months))
        .unwrap_or(NaiveDate::MIN);
    let first_in_window = history.partition_point(|s| s.date < window_start);

    // Fall back to the full history when the window is empty
    let (samples, mut data_insufficient) = if first_in_window < history.len() {
        (&history[first_in_window..], false)
    } else {
        (history, true)
    };

    let actual_years = span_years(samples);
    if actual_years < requested_years as f64 * SUFFICIENCY_RATIO {
        data_insufficient = true;
    }

    let monthly = month_end_closes(samples);
    let changes: Vec<f64> = monthly
        .windows(2)
        .map(|pair| (pair[1] / pair[0] - 1.0) * 100.0)
        .collect();

    let growth_rate_per_period = if changes.is_empty() {
        0.0
    } else {
        changes.iter().sum::<f64>() / changes.len() as f64
    };

    debug!(
        "growth estimate: {:.4}%/month over {} monthly samples ({:.2} years)",
        growth_rate_per_period,
        monthly.len(),
        actual_years
    );

    let estimate = GrowthEstimate {
        growth_rate_per_period,
        data_insufficient,
        actual_years,
        requested_years,
    };
    if let Some(warning) = estimate.warning() {
        warn!("{}", warning);
    }

    Ok(estimate)
}

/// Last closing price of each calendar month, in order
fn month_end_closes(samples: &[PriceSample]) -> Vec<f64> {
    let mut closes: Vec<f64> = Vec::new();
    let mut current_month: Option<(i32, u32)> = None;

    for sample in samples {
        let key = (sample.date.year(), sample.date.month());
        if current_month == Some(key) {
            if let Some(last) = closes.last_mut() {
                *last = sample.close;
            }
        } else {
            closes.push(sample.close);
            current_month = Some(key);
        }
    }

    closes
}

fn span_years(samples: &[PriceSample]) -> f64 {
    match (samples.first(), samples.last()) {
        (Some(first), Some(last)) => (last.date - first.date).num_days() as f64 / DAYS_PER_YEAR,
        _ => 0.0,
    }
}

fn validate_history(history: &[PriceSample]) -> Result<()> {
    for sample in history {
        if !sample.close.is_finite() || sample.close <= 0.0 {
            return Err(PlannerError::provider(format!(
                "invalid closing price {} on {}",
                sample.close, sample.date
            )));
        }
    }
    if let Some(pair) = history.windows(2).find(|pair| pair[1].date < pair[0].date) {
        return Err(PlannerError::provider(format!(
            "price history out of order: {} follows {}",
            pair[1].date, pair[0].date
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Month-end closes compounding by `rate` percent per month
    fn monthly_series(start: NaiveDate, months: u32, price: f64, rate: f64) -> Vec<PriceSample> {
        (0..months)
            .map(|i| {
                let d = start.checked_add_months(Months::new(i)).unwrap();
                PriceSample::new(d, price * (1.0 + rate / 100.0).powi(i as i32))
            })
            .collect()
    }

    #[test]
    fn test_constant_growth_is_recovered() {
        let history = monthly_series(date(2021, 1, 28), 37, 100.0, 1.5);
        let estimate = estimate_growth(&history, 3).unwrap();

        assert_relative_eq!(estimate.growth_rate_per_period, 1.5, epsilon = 1e-9);
        assert!(!estimate.data_insufficient);
        assert!(estimate.warning().is_none());
    }

    #[test]
    fn test_last_close_of_each_month_is_used() {
        let history = vec![
            PriceSample::new(date(2024, 1, 2), 50.0),
            PriceSample::new(date(2024, 1, 31), 100.0),
            PriceSample::new(date(2024, 2, 10), 500.0),
            PriceSample::new(date(2024, 2, 29), 110.0),
            PriceSample::new(date(2024, 3, 28), 99.0),
        ];
        let estimate = estimate_growth(&history, 1).unwrap();

        // +10% then -10%
        assert_relative_eq!(estimate.growth_rate_per_period, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_short_history_is_flagged() {
        let history = monthly_series(date(2023, 1, 28), 13, 20.0, -1.0);
        let estimate = estimate_growth(&history, 5).unwrap();

        assert!(estimate.data_insufficient);
        assert_relative_eq!(estimate.actual_years, 1.0, epsilon = 0.01);
        match estimate.warning() {
            Some(PlannerError::InsufficientData { requested_years, .. }) => {
                assert_eq!(requested_years, 5)
            }
            other => panic!("expected insufficient-data warning, got {:?}", other),
        }
        assert_relative_eq!(estimate.growth_rate_per_period, -1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_window_excludes_older_history() {
        // Two years of flat prices followed by one year of +2%/month
        let mut history = monthly_series(date(2020, 1, 15), 24, 10.0, 0.0);
        history.extend(monthly_series(date(2022, 1, 15), 13, 10.0, 2.0));
        let estimate = estimate_growth(&history, 1).unwrap();

        assert_relative_eq!(estimate.growth_rate_per_period, 2.0, epsilon = 1e-9);
        assert!(!estimate.data_insufficient);
    }

    #[test]
    fn test_empty_history() {
        let estimate = estimate_growth(&[], 3).unwrap();
        assert_eq!(estimate.growth_rate_per_period, 0.0);
        assert!(estimate.data_insufficient);
        assert_eq!(estimate.actual_years, 0.0);
    }

    #[test]
    fn test_malformed_history_is_rejected() {
        let zero = vec![PriceSample::new(date(2024, 1, 31), 0.0)];
        assert!(matches!(
            estimate_growth(&zero, 1),
            Err(PlannerError::ProviderFailure(_))
        ));

        let unordered = vec![
            PriceSample::new(date(2024, 2, 29), 10.0),
            PriceSample::new(date(2024, 1, 31), 10.0),
        ];
        assert!(matches!(
            estimate_growth(&unordered, 1),
            Err(PlannerError::ProviderFailure(_))
        ));

        assert!(matches!(
            estimate_growth(&unordered, 0),
            Err(PlannerError::InvalidPrecondition(_))
        ));
    }

    #[test]
    fn test_oversized_horizon_is_rejected() {
        let history = vec![PriceSample::new(date(2024, 1, 31), 10.0)];
        assert!(matches!(
            estimate_growth(&history, u32::MAX),
            Err(PlannerError::InvalidPrecondition(_))
        ));
    }
}
