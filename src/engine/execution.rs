use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

//the two legs of the rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Asset {
    Risk,
    Cash,
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Asset::Risk => write!(f, "RISK"),
            Asset::Cash => write!(f, "CASH"),
        }
    }
}

//allocation chosen at a calendar month-end
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyDecision {
    pub month_end: NaiveDate,
    //first trading day strictly after month_end, None when the data ends there
    pub effective_date: Option<NaiveDate>,
    pub asset: Asset,
    //close and sma of the signal the decision was taken on, None when it fell back to cash
    pub close: Option<f64>,
    pub sma: Option<f64>,
}

impl MonthlyDecision {
    pub fn is_fallback(&self) -> bool {
        self.sma.is_none()
    }
}

//a change of held asset on an effective date
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rebalance {
    pub date: NaiveDate,
    pub from: Asset,
    pub to: Asset,
    //equity after the day's return, before costs
    pub pre_value: f64,
    pub post_value: f64,
    pub cost_bps: f64,
    pub cost_amount: f64,
}

impl Rebalance {
    //sold plus bought notional
    pub fn notional(&self) -> f64 {
        self.pre_value * 2.0
    }
}
