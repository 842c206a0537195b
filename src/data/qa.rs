use crate::data::calendar::weekday_count;
use crate::data::series::PriceSeries;
use chrono::NaiveDate;
use tracing::warn;

//missing weekday share above which coverage is flagged (holidays included)
pub const MAX_MISSING_RATIO: f64 = 0.06;

//identical consecutive closes at or above this count are flagged as stale
pub const STALE_RUN_LENGTH: usize = 10;

//heuristic weekday coverage check over the trading calendar
pub fn check_missing_ratio(trading_days: &[NaiveDate]) -> Option<String> {
    let (first, last) = (trading_days.first()?, trading_days.last()?);
    let expected = weekday_count(*first, *last);
    if expected == 0 {
        return None;
    }

    let observed = trading_days.len();
    let missing_ratio = expected.saturating_sub(observed) as f64 / expected as f64;

    if missing_ratio > MAX_MISSING_RATIO {
        Some(format!(
            "trading days missing ratio (heuristic, includes holidays) {:.2}% exceeds {:.0}% \
             (observed {}, expected {})",
            missing_ratio * 100.0,
            MAX_MISSING_RATIO * 100.0,
            observed,
            expected
        ))
    } else {
        None
    }
}

//dates of the raw series that alignment dropped
pub fn check_alignment_loss(raw: &PriceSeries, aligned: &PriceSeries) -> Option<String> {
    let dropped = raw.len().saturating_sub(aligned.len());
    if dropped > 0 {
        Some(format!(
            "{} lost {} of {} dates when aligned to the common calendar",
            raw.ticker(),
            dropped,
            raw.len()
        ))
    } else {
        None
    }
}

//longest run of unchanged closes
pub fn check_stale_prices(series: &PriceSeries) -> Option<String> {
    let mut longest = 0usize;
    let mut longest_end = None;
    let mut run = 1usize;

    let points = series.points();
    for i in 1..points.len() {
        if points[i].close == points[i - 1].close {
            run += 1;
        } else {
            run = 1;
        }
        if run > longest {
            longest = run;
            longest_end = Some(points[i].date);
        }
    }

    match longest_end {
        Some(end) if longest >= STALE_RUN_LENGTH => Some(format!(
            "{} has {} consecutive identical closes ending {}",
            series.ticker(),
            longest,
            end
        )),
        _ => None,
    }
}

//runs every check and logs each finding
//raw/aligned pairs are (as loaded, after calendar alignment)
pub fn run_checks(pairs: &[(&PriceSeries, &PriceSeries)], trading_days: &[NaiveDate]) -> Vec<String> {
    let mut warnings = Vec::new();

    for (raw, aligned) in pairs {
        warnings.extend(check_alignment_loss(raw, aligned));
        warnings.extend(check_stale_prices(aligned));
    }
    warnings.extend(check_missing_ratio(trading_days));

    for warning in &warnings {
        warn!("QA: {}", warning);
    }

    warnings
}
