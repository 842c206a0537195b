use crate::data::calendar::{month_end_indices, same_month};
use crate::engine::execution::{Asset, MonthlyDecision};
use crate::signal::{Signal, SignalPoint};
use chrono::NaiveDate;

//one decision per calendar month-end of the signal timeline
//uses the last valid signal of that month; a month without one falls back to cash
pub fn monthly_decisions(signals: &[SignalPoint]) -> Vec<MonthlyDecision> {
    let dates: Vec<NaiveDate> = signals.iter().map(|s| s.date).collect();

    month_end_indices(&dates)
        .into_iter()
        .map(|end| {
            let month_end = dates[end];

            let last_valid = signals[..=end]
                .iter()
                .rev()
                .take_while(|s| same_month(s.date, month_end))
                .find(|s| s.is_valid());

            let asset = match last_valid.map(|s| s.signal) {
                Some(Signal::RiskOn) => Asset::Risk,
                Some(Signal::RiskOff) | None => Asset::Cash,
            };

            MonthlyDecision {
                month_end,
                effective_date: dates.get(end + 1).copied(),
                asset,
                close: last_valid.map(|s| s.close),
                sma: last_valid.and_then(|s| s.sma),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn point(date: NaiveDate, sma: Option<f64>, signal: Signal) -> SignalPoint {
        SignalPoint {
            date,
            close: 100.0,
            sma,
            signal,
        }
    }

    #[test]
    fn warm_up_month_falls_back_to_cash() {
        let signals = vec![
            point(ymd(2024, 1, 30), None, Signal::RiskOff),
            point(ymd(2024, 1, 31), None, Signal::RiskOff),
            point(ymd(2024, 2, 1), Some(90.0), Signal::RiskOn),
        ];
        let decisions = monthly_decisions(&signals);

        assert_eq!(decisions.len(), 2);
        assert_eq!(decisions[0].asset, Asset::Cash);
        assert!(decisions[0].is_fallback());
        assert_eq!(decisions[0].effective_date, Some(ymd(2024, 2, 1)));

        assert_eq!(decisions[1].asset, Asset::Risk);
        assert_eq!(decisions[1].effective_date, None);
    }

    #[test]
    fn month_end_signal_drives_decision() {
        let signals = vec![
            point(ymd(2024, 3, 28), Some(90.0), Signal::RiskOn),
            point(ymd(2024, 3, 29), Some(110.0), Signal::RiskOff),
            point(ymd(2024, 4, 1), Some(90.0), Signal::RiskOn),
        ];
        let decisions = monthly_decisions(&signals);

        assert_eq!(decisions[0].month_end, ymd(2024, 3, 29));
        assert_eq!(decisions[0].asset, Asset::Cash);
        assert_eq!(decisions[0].sma, Some(110.0));
    }

    #[test]
    fn invalid_month_end_uses_earlier_valid_signal_in_month() {
        let signals = vec![
            point(ymd(2024, 3, 28), Some(90.0), Signal::RiskOn),
            point(ymd(2024, 3, 29), None, Signal::RiskOff),
        ];
        let decisions = monthly_decisions(&signals);
        assert_eq!(decisions[0].asset, Asset::Risk);
    }

    #[test]
    fn valid_signal_from_previous_month_is_not_carried() {
        let signals = vec![
            point(ymd(2024, 2, 29), Some(90.0), Signal::RiskOn),
            point(ymd(2024, 3, 29), None, Signal::RiskOff),
        ];
        let decisions = monthly_decisions(&signals);
        assert_eq!(decisions[0].asset, Asset::Risk);
        assert_eq!(decisions[1].asset, Asset::Cash);
    }
}
