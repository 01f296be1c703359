//! Forward projection of a dividend reinvestment plan

mod state;
mod engine;
mod cashflows;

pub use state::SimulationState;
pub use engine::{project, ProjectionConfig, ProjectionEngine, MAX_HORIZON_MONTHS};
pub use cashflows::{CashflowRow, ProjectionResult, ProjectionSummary};
