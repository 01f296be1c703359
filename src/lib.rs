//! Dividend Planner - Projection engine for dividend reinvestment plans
//!
//! This library provides:
//! - Growth-rate estimation from closing-price history
//! - Dividend payout schedules by frequency (weekly approximated monthly)
//! - Month-by-month reinvestment projection with tax and break-even tracking
//! - Goal solving: capital and monthly savings for a target net income
//! - File-backed market data with a per-ticker analysis cache

pub mod error;
pub mod config;
pub mod market;
pub mod estimation;
pub mod projection;
pub mod goal;
pub mod scenario;

// Re-export commonly used types
pub use error::{PlannerError, Result};
pub use config::PlannerConfig;
pub use market::{CsvMarketData, DividendEvent, MarketAnalyzer, MarketSnapshot, PriceSample};
pub use estimation::{
    build_payout_schedule, estimate_growth, GrowthEstimate, PayoutFrequency, PayoutSchedule,
};
pub use projection::{project, ProjectionConfig, ProjectionEngine, ProjectionResult};
pub use goal::{solve_goal, GoalConfig, GoalPlan, GoalSolver};
pub use scenario::ScenarioRunner;
