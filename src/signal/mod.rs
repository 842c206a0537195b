pub mod sma_trend;

pub use sma_trend::SignalEngine;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

//trend state of the risk asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Signal {
    RiskOn,
    RiskOff,
}

impl Signal {
    //close strictly above the average is risk-on; a tie is risk-off
    pub fn from_close(close: f64, sma: f64) -> Self {
        if close > sma {
            Signal::RiskOn
        } else {
            Signal::RiskOff
        }
    }
}

//one signal per trading day
//sma is None during warm-up, when fewer than `window` closes exist
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalPoint {
    pub date: NaiveDate,
    pub close: f64,
    pub sma: Option<f64>,
    pub signal: Signal,
}

impl SignalPoint {
    pub fn is_valid(&self) -> bool {
        self.sma.is_some()
    }
}

//helper function to calculate simple moving average
pub fn sma(prices: &[f64]) -> Option<f64> {
    if prices.is_empty() {
        return None;
    }
    Some(prices.iter().sum::<f64>() / prices.len() as f64)
}
