//a Rust-based 200-day sma trend rotation signal and backtesting engine

pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod report;
pub mod research;
pub mod signal;

//prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{RebalanceFrequency, RotationConfig, RunConfiguration};
    pub use crate::data::{align, load_price_csv, PricePoint, PriceSeries, SeriesError};
    pub use crate::engine::{
        Asset, BacktestResult, MonthlyDecision, Rebalance, RotationBacktester,
    };
    pub use crate::error::BacktestError;
    pub use crate::metrics::{EquityCurve, EquityPoint, PerformanceReport};
    pub use crate::pipeline::{run_pipeline, RotationOutcome};
    pub use crate::research::{run_sweep, SweepReport};
    pub use crate::signal::{Signal, SignalEngine, SignalPoint};
}
