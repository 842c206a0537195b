use crate::data::PriceSeries;
use crate::error::{BacktestError, Result};
use crate::signal::{sma, Signal, SignalPoint};

//close-vs-sma trend filter
//each point depends only on closes up to and including its own date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalEngine {
    window: usize,
}

impl SignalEngine {
    pub fn new(window: usize) -> Result<Self> {
        if window == 0 {
            return Err(BacktestError::InvalidConfig {
                reason: "sma window must be positive".to_string(),
            });
        }
        Ok(SignalEngine { window })
    }

    pub fn window(&self) -> usize {
        self.window
    }

    //computes one SignalPoint per trading day
    //warm-up days are marked invalid and carry RiskOff
    pub fn compute(&self, series: &PriceSeries) -> Result<Vec<SignalPoint>> {
        if series.is_empty() {
            return Err(BacktestError::InsufficientData {
                ticker: series.ticker().to_string(),
            });
        }

        let closes = series.closes();
        let signals = series
            .points()
            .iter()
            .enumerate()
            .map(|(i, point)| {
                //trailing window ending at and including i
                let average = if i + 1 >= self.window {
                    sma(&closes[i + 1 - self.window..=i])
                } else {
                    None
                };

                let signal = match average {
                    Some(avg) => Signal::from_close(point.close, avg),
                    None => Signal::RiskOff,
                };

                SignalPoint {
                    date: point.date,
                    close: point.close,
                    sma: average,
                    signal,
                }
            })
            .collect();

        Ok(signals)
    }
}
