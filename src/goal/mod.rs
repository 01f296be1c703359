//! Goal-seeking: capital and savings needed for a target dividend income

mod solver;

pub use solver::{solve_goal, GoalConfig, GoalPlan, GoalSolver};
