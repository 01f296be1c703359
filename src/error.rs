//! Error taxonomy shared by the estimators, the projection engine and the goal solver

use thiserror::Error;

/// Errors surfaced to the presentation layer
#[derive(Debug, Error)]
pub enum PlannerError {
    /// Requested history is longer than what the provider holds.
    /// Non-fatal: the estimate falls back to the available span.
    #[error("insufficient data: requested {requested_years} years, only {actual_years:.1} available")]
    InsufficientData {
        requested_years: u32,
        actual_years: f64,
    },

    /// Inputs that would make a computation divide by zero or emit NaN/Infinity
    #[error("invalid precondition: {0}")]
    InvalidPrecondition(String),

    /// Missing or malformed market data
    #[error("provider failure: {0}")]
    ProviderFailure(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PlannerError {
    pub(crate) fn precondition(msg: impl Into<String>) -> Self {
        PlannerError::InvalidPrecondition(msg.into())
    }

    pub(crate) fn provider(msg: impl Into<String>) -> Self {
        PlannerError::ProviderFailure(msg.into())
    }

    /// Whether the caller may continue with a degraded result
    pub fn is_warning(&self) -> bool {
        matches!(self, PlannerError::InsufficientData { .. })
    }
}

pub type Result<T> = std::result::Result<T, PlannerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_insufficient_data_is_a_warning() {
        let warning = PlannerError::InsufficientData { requested_years: 5, actual_years: 2.3 };
        assert!(warning.is_warning());
        assert_eq!(
            warning.to_string(),
            "insufficient data: requested 5 years, only 2.3 available"
        );

        assert!(!PlannerError::precondition("price is zero").is_warning());
        assert!(!PlannerError::provider("empty file").is_warning());
    }
}
