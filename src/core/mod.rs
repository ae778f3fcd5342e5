mod engine;
mod error;
mod solver;
mod types;

pub use engine::{MAX_MONTHS, MONTHS_PER_YEAR, simulate};
pub use error::FireError;
pub use solver::{derive_target_from_spending, required_monthly_contribution};
pub use types::{GrowthSample, SimulationParameters, SimulationResult, TargetSpec};
