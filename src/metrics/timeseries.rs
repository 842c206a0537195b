use crate::data::SeriesError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

//a point in the equity curve
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: f64,
}

impl EquityPoint {
    pub fn new(date: NaiveDate, equity: f64) -> Self {
        EquityPoint { date, equity }
    }
}

//append-only equity history with strictly increasing dates
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EquityCurve {
    points: Vec<EquityPoint>,
}

impl EquityCurve {
    //starts a curve at the initial capital
    pub fn start(date: NaiveDate, initial_equity: f64) -> Self {
        EquityCurve {
            points: vec![EquityPoint::new(date, initial_equity)],
        }
    }

    //builds a curve from existing points, validating date order and values
    pub fn from_points(points: Vec<EquityPoint>) -> Result<Self, SeriesError> {
        for pair in points.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(SeriesError::NotIncreasing {
                    previous: pair[0].date,
                    current: pair[1].date,
                });
            }
        }
        for point in &points {
            if !point.equity.is_finite() {
                return Err(SeriesError::NonFiniteClose { date: point.date });
            }
            if point.equity <= 0.0 {
                return Err(SeriesError::NonPositiveClose {
                    date: point.date,
                    close: point.equity,
                });
            }
        }
        Ok(EquityCurve { points })
    }

    pub(crate) fn push(&mut self, date: NaiveDate, equity: f64) {
        debug_assert!(self.points.last().map_or(true, |p| p.date < date));
        self.points.push(EquityPoint::new(date, equity));
    }

    pub fn points(&self) -> &[EquityPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&EquityPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&EquityPoint> {
        self.points.last()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.equity).collect()
    }

    pub fn equity_on(&self, date: NaiveDate) -> Option<f64> {
        self.points
            .binary_search_by(|p| p.date.cmp(&date))
            .ok()
            .map(|idx| self.points[idx].equity)
    }
}

//drawdown at each point as a non-positive fraction of the running peak
pub fn drawdown_series(equity_values: &[f64]) -> Vec<f64> {
    let mut peak = f64::MIN;

    equity_values
        .iter()
        .map(|&equity| {
            //update peak
            if equity > peak {
                peak = equity;
            }
            if peak > 0.0 {
                equity / peak - 1.0
            } else {
                0.0
            }
        })
        .collect()
}

//calculates maximum drawdown, reported as a non-positive fraction
pub fn max_drawdown(equity_values: &[f64]) -> f64 {
    drawdown_series(equity_values)
        .into_iter()
        .fold(0.0, f64::min)
}

//calculates log returns from equity values
pub fn log_returns(equity_values: &[f64]) -> Vec<f64> {
    equity_values
        .windows(2)
        .map(|pair| (pair[1] / pair[0]).ln())
        .collect()
}
