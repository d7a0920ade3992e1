mod catalog;
mod engine;
mod portfolio;
mod types;

pub use catalog::{FUNDS, defaults, fund_catalog};
pub use engine::{PROJECTION_YEARS, simulate};
pub use portfolio::{blended_yield, compute_stats};
pub use types::{
    Fund, Inputs, PortfolioStats, RawValue, RiskLevel, SimulationResult, SimulationYear,
};
