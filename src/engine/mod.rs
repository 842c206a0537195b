pub mod backtest;
pub mod costs;
pub mod execution;
pub mod schedule;

pub use backtest::{BacktestResult, RotationBacktester};
pub use costs::{apply_cost, apply_switch_cost};
pub use execution::{Asset, MonthlyDecision, Rebalance};
pub use schedule::monthly_decisions;
