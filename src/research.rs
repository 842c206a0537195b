use crate::config::RotationConfig;
use crate::data::PriceSeries;
use crate::error::{BacktestError, Result};
use crate::metrics::PerformanceReport;
use crate::pipeline::run_pipeline;
use indexmap::IndexMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

//absolute spread across windows above which the rotation is called fragile
pub const MAX_CAGR_RANGE: f64 = 0.02;
pub const MAX_DRAWDOWN_RANGE: f64 = 0.05;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepReport {
    pub base_config: RotationConfig,
    //keyed by sma window, ascending
    pub results: IndexMap<usize, PerformanceReport>,
    pub robust: bool,
    pub reasons: Vec<String>,
}

impl SweepReport {
    pub fn verdict(&self) -> &'static str {
        if self.robust {
            "robust"
        } else {
            "not robust"
        }
    }
}

//runs the full pipeline once per window, in parallel
//each variant gets its own config copy and shares only the read-only series
//`cancel` is checked before each variant starts
pub fn run_sweep(
    risk: &PriceSeries,
    cash: &PriceSeries,
    base_config: &RotationConfig,
    windows: &[usize],
    cancel: Option<&AtomicBool>,
) -> Result<SweepReport> {
    if windows.is_empty() {
        return Err(BacktestError::InvalidConfig {
            reason: "sweep needs at least one window".to_string(),
        });
    }

    let mut windows = windows.to_vec();
    windows.sort_unstable();
    windows.dedup();

    let cancelled = || cancel.map_or(false, |flag| flag.load(Ordering::Relaxed));

    let outcomes: Vec<Option<Result<PerformanceReport>>> = windows
        .par_iter()
        .map(|&window| {
            if cancelled() {
                return None;
            }
            let config = base_config.with_window(window);
            let outcome = run_pipeline(risk, cash, &config).map(|o| o.report);
            if let Ok(report) = &outcome {
                info!(
                    window,
                    cagr = report.cagr,
                    max_drawdown = report.max_drawdown,
                    "sweep variant complete"
                );
            }
            Some(outcome)
        })
        .collect();

    let completed = outcomes.iter().filter(|o| o.is_some()).count();
    if completed < windows.len() {
        return Err(BacktestError::Cancelled {
            completed,
            requested: windows.len(),
        });
    }

    let mut results = IndexMap::with_capacity(windows.len());
    for (window, outcome) in windows.iter().zip(outcomes.into_iter().flatten()) {
        results.insert(*window, outcome?);
    }

    let reasons = robustness_reasons(&results);

    Ok(SweepReport {
        base_config: base_config.clone(),
        robust: reasons.is_empty(),
        reasons,
        results,
    })
}

//reasons the variants disagree too much, empty when robust
pub fn robustness_reasons(results: &IndexMap<usize, PerformanceReport>) -> Vec<String> {
    let spread = |values: Vec<f64>| {
        let max = values.iter().copied().fold(f64::MIN, f64::max);
        let min = values.iter().copied().fold(f64::MAX, f64::min);
        max - min
    };

    let cagr_range = spread(results.values().map(|r| r.cagr).collect());
    let dd_range = spread(results.values().map(|r| r.max_drawdown).collect());

    let mut reasons = Vec::new();
    if cagr_range.abs() > MAX_CAGR_RANGE {
        reasons.push(format!(
            "CAGR range {:.2}% exceeds {:.0}% absolute.",
            cagr_range * 100.0,
            MAX_CAGR_RANGE * 100.0
        ));
    }
    if dd_range.abs() > MAX_DRAWDOWN_RANGE {
        reasons.push(format!(
            "Max drawdown range {:.2}% exceeds {:.0}% absolute.",
            dd_range * 100.0,
            MAX_DRAWDOWN_RANGE * 100.0
        ));
    }
    reasons
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::calendar::weekdays_from;
    use chrono::NaiveDate;

    fn inputs() -> (PriceSeries, PriceSeries) {
        let days = weekdays_from(NaiveDate::from_ymd_opt(2021, 1, 4).unwrap(), 400);
        let risk = PriceSeries::from_pairs(
            "SPY",
            days.iter()
                .enumerate()
                .map(|(i, d)| (*d, 100.0 + (i as f64 * 0.1).sin() * 5.0 + i as f64 * 0.05)),
        )
        .unwrap();
        let cash = PriceSeries::from_pairs(
            "BIL",
            days.iter().enumerate().map(|(i, d)| (*d, 100.0 + i as f64 * 0.01)),
        )
        .unwrap();
        (risk, cash)
    }

    #[test]
    fn results_are_ordered_and_deduplicated() {
        let (risk, cash) = inputs();
        let sweep =
            run_sweep(&risk, &cash, &RotationConfig::default(), &[220, 180, 200, 180], None)
                .unwrap();

        let windows: Vec<_> = sweep.results.keys().copied().collect();
        assert_eq!(windows, vec![180, 200, 220]);
    }

    #[test]
    fn parallel_variant_matches_single_run() {
        let (risk, cash) = inputs();
        let base = RotationConfig::default();
        let sweep = run_sweep(&risk, &cash, &base, &[150, 200], None).unwrap();
        let single = run_pipeline(&risk, &cash, &base.with_window(150)).unwrap();

        assert_eq!(sweep.results[&150], single.report);
    }

    #[test]
    fn cancelled_sweep_reports_progress() {
        let (risk, cash) = inputs();
        let flag = AtomicBool::new(true);
        let err = run_sweep(&risk, &cash, &RotationConfig::default(), &[100, 200], Some(&flag))
            .unwrap_err();
        assert_eq!(
            err,
            BacktestError::Cancelled {
                completed: 0,
                requested: 2
            }
        );
    }

    #[test]
    fn empty_window_list_is_rejected() {
        let (risk, cash) = inputs();
        assert!(run_sweep(&risk, &cash, &RotationConfig::default(), &[], None).is_err());
    }
}
