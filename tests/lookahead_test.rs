//! Property tests: no look-ahead in signals or decisions, and the execution lag.

mod common;

use common::*;
use proptest::prelude::*;
use sentinel::engine::monthly_decisions;
use sentinel::prelude::*;

const DAYS: usize = 140;
const WINDOW: usize = 20;

fn closes_strategy() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(50.0f64..150.0, DAYS)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn future_prices_never_change_past_signals(
        closes in closes_strategy(),
        cut in WINDOW..DAYS - 1,
        bump in 1.0f64..50.0,
    ) {
        let days = trading_days(DAYS);
        let mut altered = closes.clone();
        for close in altered.iter_mut().skip(cut + 1) {
            *close += bump;
        }

        let engine = SignalEngine::new(WINDOW).unwrap();
        let before = engine.compute(&series("SPY", &days, &closes)).unwrap();
        let after = engine.compute(&series("SPY", &days, &altered)).unwrap();

        prop_assert_eq!(&before[..=cut], &after[..=cut]);

        let cutoff = days[cut];
        let up_to_cutoff = |signals: &[SignalPoint]| -> Vec<MonthlyDecision> {
            monthly_decisions(signals)
                .into_iter()
                .filter(|d| d.month_end <= cutoff)
                .collect()
        };
        prop_assert_eq!(up_to_cutoff(&before), up_to_cutoff(&after));
    }

    #[test]
    fn decisions_never_touch_equity_before_next_month(
        closes in closes_strategy(),
        month in 0usize..6,
    ) {
        let days = trading_days(DAYS);
        let risk = series("SPY", &days, &closes);
        let cash = series(
            "BIL",
            &days,
            &(0..DAYS).map(|i| 100.0 + i as f64 * 0.01).collect::<Vec<_>>(),
        );
        let config = RotationConfig { sma_window: WINDOW, ..RotationConfig::default() };

        let signals = SignalEngine::new(WINDOW).unwrap().compute(&risk).unwrap();
        let backtester = RotationBacktester::new(config).unwrap();
        let base = backtester.run(&signals, &risk, &cash).unwrap();

        let decision = base.decisions[month.min(base.decisions.len() - 1)];
        let month_end_idx = days.iter().position(|d| *d == decision.month_end).unwrap();

        //invert this month-end's decision and every later one
        let mut flipped = signals.clone();
        for point in flipped.iter_mut().skip(month_end_idx) {
            point.signal = match point.signal {
                Signal::RiskOn => Signal::RiskOff,
                Signal::RiskOff => Signal::RiskOn,
            };
            point.sma = Some(point.sma.unwrap_or(point.close));
        }
        let altered = backtester.run(&flipped, &risk, &cash).unwrap();

        let base_values = base.equity_curve.values();
        let altered_values = altered.equity_curve.values();
        prop_assert_eq!(&base_values[..=month_end_idx], &altered_values[..=month_end_idx]);

        //the day after the month-end trades at its close, so its equity is untouched too
        if let Some(effective) = decision.effective_date {
            let idx = month_end_idx + 1;
            prop_assert_eq!(days[idx], effective);
            prop_assert_eq!(base_values[idx], altered_values[idx]);
            prop_assert_ne!(base.holdings[idx].1, altered.holdings[idx].1);
        }
    }
}
