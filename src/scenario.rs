//! Scenario runner for batch projections
//!
//! Holds one market snapshot and payout schedule, then runs many projections
//! with different configurations or growth assumptions. Every run owns its
//! own simulation state, so batches are run in parallel.

use rayon::prelude::*;

use crate::error::Result;
use crate::estimation::PayoutSchedule;
use crate::market::MarketSnapshot;
use crate::projection::{ProjectionConfig, ProjectionEngine, ProjectionResult};

/// Pre-loaded scenario runner for batch projections
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new(snapshot, schedule);
///
/// for result in runner.run_growth_sweep(config, &[-1.0, 0.0, 1.0]) {
///     let (rate, projection) = result;
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    snapshot: MarketSnapshot,
    schedule: PayoutSchedule,
}

impl ScenarioRunner {
    pub fn new(snapshot: MarketSnapshot, schedule: PayoutSchedule) -> Self {
        Self { snapshot, schedule }
    }

    /// Run a single projection with the given config
    pub fn run(&self, config: ProjectionConfig) -> Result<ProjectionResult> {
        ProjectionEngine::new(config).project(&self.snapshot, &self.schedule)
    }

    /// Run multiple configurations against the same market, in input order
    pub fn run_scenarios(&self, configs: &[ProjectionConfig]) -> Vec<Result<ProjectionResult>> {
        configs.par_iter().map(|config| self.run(*config)).collect()
    }

    /// Run one configuration under several monthly growth rates (percent)
    pub fn run_growth_sweep(
        &self,
        config: ProjectionConfig,
        growth_rates: &[f64],
    ) -> Vec<(f64, Result<ProjectionResult>)> {
        growth_rates
            .par_iter()
            .map(|&rate| {
                let result = self
                    .snapshot
                    .with_growth_rate(rate)
                    .and_then(|snapshot| {
                        ProjectionEngine::new(config).project(&snapshot, &self.schedule)
                    });
                (rate, result)
            })
            .collect()
    }

    pub fn snapshot(&self) -> &MarketSnapshot {
        &self.snapshot
    }

    pub fn schedule(&self) -> &PayoutSchedule {
        &self.schedule
    }
}
