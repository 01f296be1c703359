//! Planner settings threaded explicitly into the engine
//!
//! Everything a planning session can tune lives here and is passed by value;
//! nothing is read from ambient state.

use std::fs::File;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, Result};
use crate::estimation::PayoutFrequency;
use crate::goal::GoalConfig;
use crate::market::loader::DEFAULT_DATA_PATH;
use crate::market::MarketSnapshot;
use crate::projection::ProjectionConfig;

/// Longest analysis and investment period offered, in years
pub const MAX_YEARS: u32 = 10;

/// Settings for one planning session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub ticker: String,

    /// Analysis window and investment horizon, in years
    pub years: u32,

    /// Fraction of gross dividends withheld (0.15 = 15%)
    pub tax_rate: f64,

    pub frequency: PayoutFrequency,

    /// Monthly percent growth to use instead of the estimate
    pub growth_override: Option<f64>,

    pub initial_capital: f64,
    pub monthly_contribution: f64,

    /// Net monthly income targeted by the goal solver
    pub target_monthly_income: f64,

    /// Directory of CSV market data
    pub data_dir: PathBuf,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            ticker: "TSLY".to_string(),
            years: 3,
            tax_rate: 0.15,
            frequency: PayoutFrequency::Monthly,
            growth_override: None,
            initial_capital: 10_000_000.0,
            monthly_contribution: 500_000.0,
            target_monthly_income: 1_000_000.0,
            data_dir: PathBuf::from(DEFAULT_DATA_PATH),
        }
    }
}

impl PlannerConfig {
    /// Load settings from a JSON file; missing fields take their defaults
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let config: Self = serde_json::from_reader(file)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.ticker.trim().is_empty() {
            return Err(PlannerError::precondition("ticker must not be empty"));
        }
        if self.years == 0 || self.years > MAX_YEARS {
            return Err(PlannerError::precondition(format!(
                "years must be between 1 and {}, got {}",
                MAX_YEARS, self.years
            )));
        }
        if let Some(rate) = self.growth_override {
            if !rate.is_finite() || rate <= -100.0 {
                return Err(PlannerError::precondition(format!(
                    "growth override must be above -100%/month, got {}",
                    rate
                )));
            }
        }
        self.projection_config().validate()
    }

    pub fn horizon_months(&self) -> u32 {
        self.years * 12
    }

    pub fn projection_config(&self) -> ProjectionConfig {
        ProjectionConfig {
            initial_capital: self.initial_capital,
            monthly_contribution: self.monthly_contribution,
            tax_rate: self.tax_rate,
            horizon_months: self.horizon_months(),
        }
    }

    pub fn goal_config(&self) -> GoalConfig {
        GoalConfig {
            target_monthly_income: self.target_monthly_income,
            tax_rate: self.tax_rate,
            horizon_months: self.horizon_months(),
        }
    }

    /// Snapshot carrying the override growth rate, if one is set
    pub fn apply_growth_override(&self, snapshot: MarketSnapshot) -> Result<MarketSnapshot> {
        match self.growth_override {
            Some(rate) => snapshot.with_growth_rate(rate),
            None => Ok(snapshot),
        }
    }
}
