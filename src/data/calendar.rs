use crate::data::series::PriceSeries;
use chrono::{Datelike, NaiveDate};

//dates present in both series, ascending
pub fn common_trading_days(a: &PriceSeries, b: &PriceSeries) -> Vec<NaiveDate> {
    let mut left = a.dates().peekable();
    let mut right = b.dates().peekable();
    let mut common = Vec::new();

    //both inputs are strictly increasing, so a merge walk suffices
    while let (Some(&l), Some(&r)) = (left.peek(), right.peek()) {
        if l == r {
            common.push(l);
            left.next();
            right.next();
        } else if l < r {
            left.next();
        } else {
            right.next();
        }
    }

    common
}

//restricts both series to their shared trading days
//dates that only one side has are dropped, never filled
pub fn align(a: &PriceSeries, b: &PriceSeries) -> (PriceSeries, PriceSeries) {
    let days = common_trading_days(a, b);
    (a.restrict_to(&days), b.restrict_to(&days))
}

//indices of the last trading day of each calendar month
//the final date always closes its month, even if the month is incomplete
pub fn month_end_indices(dates: &[NaiveDate]) -> Vec<usize> {
    let mut ends = Vec::new();

    for (i, date) in dates.iter().enumerate() {
        let is_last = match dates.get(i + 1) {
            Some(next) => !same_month(*date, *next),
            None => true,
        };
        if is_last {
            ends.push(i);
        }
    }

    ends
}

pub fn same_month(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

//weekdays between two dates inclusive
pub fn weekday_count(start: NaiveDate, end: NaiveDate) -> usize {
    start
        .iter_days()
        .take_while(|d| *d <= end)
        .filter(|d| d.weekday().number_from_monday() <= 5)
        .count()
}

//generates `count` consecutive weekdays starting at `start`
pub fn weekdays_from(start: NaiveDate, count: usize) -> Vec<NaiveDate> {
    start
        .iter_days()
        .filter(|d| d.weekday().number_from_monday() <= 5)
        .take(count)
        .collect()
}
