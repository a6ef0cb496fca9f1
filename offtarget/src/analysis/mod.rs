pub mod derivation;
pub mod risk;

pub use derivation::{derive, DerivedView, FilterState, RegionFilter, SortKey};
pub use risk::{RiskLevel, RiskSummary, ScoreStats};
