#![allow(dead_code)]

use chrono::NaiveDate;
use sentinel::data::calendar::weekdays_from;
use sentinel::prelude::*;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn trading_days(count: usize) -> Vec<NaiveDate> {
    weekdays_from(date(2021, 1, 4), count)
}

pub fn series(ticker: &str, days: &[NaiveDate], closes: &[f64]) -> PriceSeries {
    assert_eq!(days.len(), closes.len());
    PriceSeries::from_pairs(ticker, days.iter().copied().zip(closes.iter().copied())).unwrap()
}

pub fn flat(ticker: &str, days: &[NaiveDate], close: f64) -> PriceSeries {
    series(ticker, days, &vec![close; days.len()])
}

pub fn config(window: usize) -> RotationConfig {
    RotationConfig {
        sma_window: window,
        initial_capital: 1_000.0,
        ..RotationConfig::default()
    }
}

//index of the first trading day of the month following `day`
pub fn first_day_of_next_month(days: &[NaiveDate], day: NaiveDate) -> Option<usize> {
    use chrono::Datelike;
    days.iter()
        .position(|d| (d.year(), d.month()) > (day.year(), day.month()))
}
