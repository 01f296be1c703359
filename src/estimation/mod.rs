//! Estimators turning raw market history into engine inputs

mod growth;
mod dividends;

pub use growth::{estimate_growth, GrowthEstimate, SUFFICIENCY_RATIO};
pub use dividends::{
    build_payout_schedule, trailing_annual_dividend, PayoutFrequency, PayoutSchedule,
};
