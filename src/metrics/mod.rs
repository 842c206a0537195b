pub mod summary;
pub mod timeseries;

pub use summary::PerformanceReport;
pub use timeseries::{EquityCurve, EquityPoint};
