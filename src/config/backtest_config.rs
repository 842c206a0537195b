use crate::error::{BacktestError, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

//rebalance frequency, monthly is the only schedule the rotation supports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RebalanceFrequency {
    #[default]
    Monthly,
}

//engine parameters, passed explicitly into every stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationConfig {
    pub risk_ticker: String,
    pub cash_ticker: String,
    pub sma_window: usize,
    pub rebalance: RebalanceFrequency,
    pub initial_capital: f64,
    //per-side transaction cost in basis points
    pub cost_bps: f64,
    pub periods_per_year: usize,
}

impl Default for RotationConfig {
    fn default() -> Self {
        RotationConfig {
            risk_ticker: "SPY".to_string(),
            cash_ticker: "BIL".to_string(),
            sma_window: 200,
            rebalance: RebalanceFrequency::Monthly,
            initial_capital: 100_000.0,
            cost_bps: 0.0,
            periods_per_year: 252,
        }
    }
}

impl RotationConfig {
    //copy of this config with a different sma window
    pub fn with_window(&self, sma_window: usize) -> Self {
        RotationConfig {
            sma_window,
            ..self.clone()
        }
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| -> Result<()> { Err(BacktestError::InvalidConfig { reason }) };

        if self.sma_window == 0 {
            return invalid("sma_window must be positive".to_string());
        }
        if !self.initial_capital.is_finite() || self.initial_capital <= 0.0 {
            return invalid(format!(
                "initial_capital must be positive, got {}",
                self.initial_capital
            ));
        }
        if !self.cost_bps.is_finite() || self.cost_bps < 0.0 || self.cost_bps >= 10_000.0 {
            return invalid(format!(
                "cost_bps must be in [0, 10000), got {}",
                self.cost_bps
            ));
        }
        if self.periods_per_year == 0 {
            return invalid("periods_per_year must be positive".to_string());
        }
        if self.risk_ticker == self.cash_ticker {
            return invalid(format!(
                "risk and cash tickers must differ, both are {}",
                self.risk_ticker
            ));
        }

        Ok(())
    }
}

//complete run configuration as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfiguration {
    //data
    pub risk_data_path: PathBuf,
    pub cash_data_path: PathBuf,

    //engine
    #[serde(default)]
    pub rotation: RotationConfig,

    //optional output paths
    #[serde(default)]
    pub output_equity_csv: Option<PathBuf>,
    #[serde(default)]
    pub output_rebalances_csv: Option<PathBuf>,
    #[serde(default)]
    pub output_decision_record: Option<PathBuf>,
}

impl Default for RunConfiguration {
    fn default() -> Self {
        RunConfiguration {
            risk_data_path: PathBuf::from("spy.csv"),
            cash_data_path: PathBuf::from("bil.csv"),
            rotation: RotationConfig::default(),
            output_equity_csv: None,
            output_rebalances_csv: None,
            output_decision_record: None,
        }
    }
}

impl RunConfiguration {
    //load configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .context(format!("Failed to read config file {:?}", path))?;
        let config: RunConfiguration = serde_json::from_str(&contents)
            .context(format!("Failed to parse config file {:?}", path))?;
        Ok(config)
    }

    //output paths given on the command line replace the ones from the file
    pub fn with_outputs(
        mut self,
        equity_csv: Option<PathBuf>,
        rebalances_csv: Option<PathBuf>,
        decision_record: Option<PathBuf>,
    ) -> Self {
        if equity_csv.is_some() {
            self.output_equity_csv = equity_csv;
        }
        if rebalances_csv.is_some() {
            self.output_rebalances_csv = rebalances_csv;
        }
        if decision_record.is_some() {
            self.output_decision_record = decision_record;
        }
        self
    }

    //save configuration to a JSON file
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).context(format!("Failed to write config file {:?}", path))?;
        Ok(())
    }
}
