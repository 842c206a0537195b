use crate::data::SeriesError;
use chrono::NaiveDate;
use thiserror::Error;

//errors surfaced by the signal, backtest and evaluation stages
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BacktestError {
    #[error("Insufficient data: series for {ticker} has no observations")]
    InsufficientData { ticker: String },

    #[error("Series mismatch: {ticker} has no close on {date}")]
    SeriesMismatch { ticker: String, date: NaiveDate },

    #[error("Empty curve: need at least 2 points to compute a return, got {points}")]
    EmptyCurve { points: usize },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("Sweep cancelled after {completed} of {requested} variants")]
    Cancelled { completed: usize, requested: usize },

    #[error(transparent)]
    Series(#[from] SeriesError),
}

pub type Result<T> = std::result::Result<T, BacktestError>;
