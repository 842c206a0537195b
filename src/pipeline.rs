use crate::config::RotationConfig;
use crate::data::PriceSeries;
use crate::engine::{BacktestResult, RotationBacktester};
use crate::error::Result;
use crate::metrics::PerformanceReport;
use crate::signal::{SignalEngine, SignalPoint};
use serde::{Deserialize, Serialize};

//everything one rotation run produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotationOutcome {
    pub config: RotationConfig,
    pub signals: Vec<SignalPoint>,
    pub backtest: BacktestResult,
    pub report: PerformanceReport,
}

//signals, backtest and evaluation for one config
//pure: identical inputs give identical outcomes
pub fn run_pipeline(
    risk: &PriceSeries,
    cash: &PriceSeries,
    config: &RotationConfig,
) -> Result<RotationOutcome> {
    config.validate()?;

    let signals = SignalEngine::new(config.sma_window)?.compute(risk)?;
    let backtest = RotationBacktester::new(config.clone())?.run(&signals, risk, cash)?;
    let report = PerformanceReport::from_backtest(&backtest, config.periods_per_year)?;

    Ok(RotationOutcome {
        config: config.clone(),
        signals,
        backtest,
        report,
    })
}
