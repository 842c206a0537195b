use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SeriesError {
    #[error("Dates not strictly increasing: {current} follows {previous}")]
    NotIncreasing {
        previous: NaiveDate,
        current: NaiveDate,
    },
    #[error("Non-positive close ({close}) on {date}")]
    NonPositiveClose { date: NaiveDate, close: f64 },
    #[error("Non-finite close on {date}")]
    NonFiniteClose { date: NaiveDate },
}

//a single daily close
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        PricePoint { date, close }
    }
}

//immutable date-indexed closing prices for one ticker
//dates are strictly increasing and every close is finite and positive
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceSeries {
    ticker: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    //creates a new PriceSeries with validation
    //an empty series is allowed here, the signal stage rejects it
    pub fn new(ticker: impl Into<String>, points: Vec<PricePoint>) -> Result<Self, SeriesError> {
        for pair in points.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(SeriesError::NotIncreasing {
                    previous: pair[0].date,
                    current: pair[1].date,
                });
            }
        }

        for point in &points {
            if !point.close.is_finite() {
                return Err(SeriesError::NonFiniteClose { date: point.date });
            }
            if point.close <= 0.0 {
                return Err(SeriesError::NonPositiveClose {
                    date: point.date,
                    close: point.close,
                });
            }
        }

        Ok(PriceSeries {
            ticker: ticker.into(),
            points,
        })
    }

    //convenience constructor from parallel date/close pairs
    pub fn from_pairs<I>(ticker: impl Into<String>, pairs: I) -> Result<Self, SeriesError>
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        let points = pairs
            .into_iter()
            .map(|(date, close)| PricePoint::new(date, close))
            .collect();
        Self::new(ticker, points)
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.points.iter().map(|p| p.date)
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    //close on an exact date, None if the date is not a trading day of this series
    pub fn close_on(&self, date: NaiveDate) -> Option<f64> {
        self.points
            .binary_search_by(|p| p.date.cmp(&date))
            .ok()
            .map(|idx| self.points[idx].close)
    }

    //returns a new series restricted to the given dates (which must be sorted)
    pub fn restrict_to(&self, dates: &[NaiveDate]) -> PriceSeries {
        let points = self
            .points
            .iter()
            .filter(|p| dates.binary_search(&p.date).is_ok())
            .copied()
            .collect();

        PriceSeries {
            ticker: self.ticker.clone(),
            points,
        }
    }
}
