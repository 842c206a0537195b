use crate::engine::{Asset, BacktestResult};
use crate::error::{BacktestError, Result};
use crate::metrics::timeseries::{log_returns, max_drawdown, EquityCurve};
use chrono::NaiveDate;
use prettytable::{Cell, Row, Table};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

//summary statistics of a finished equity curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub initial_equity: f64,
    pub final_equity: f64,
    //number of returns in the curve (points - 1)
    pub periods: usize,
    pub total_return: f64,
    pub cagr: f64,
    //non-positive fraction
    pub max_drawdown: f64,
    pub annualized_volatility: f64,
    //cagr / volatility, NaN when volatility is zero
    pub risk_adjusted_return: f64,
    pub rebalance_count: usize,
    pub turnover_initial: f64,
    pub turnover_avg_equity: f64,
    //fraction of days holding the risk asset
    pub exposure: f64,
}

impl PerformanceReport {
    //core statistics of an equity curve, trade statistics left at zero
    pub fn evaluate(curve: &EquityCurve, periods_per_year: usize) -> Result<Self> {
        if curve.len() < 2 {
            return Err(BacktestError::EmptyCurve {
                points: curve.len(),
            });
        }
        if periods_per_year == 0 {
            return Err(BacktestError::InvalidConfig {
                reason: "periods_per_year must be positive".to_string(),
            });
        }

        let points = curve.points();
        let first = points[0];
        let last = points[points.len() - 1];
        let values = curve.values();

        let periods = points.len() - 1;
        let growth = last.equity / first.equity;
        let total_return = growth - 1.0;
        let cagr = growth.powf(periods_per_year as f64 / periods as f64) - 1.0;

        let annualized_volatility =
            log_returns(&values).iter().population_std_dev() * (periods_per_year as f64).sqrt();

        let risk_adjusted_return = if annualized_volatility > 0.0 {
            cagr / annualized_volatility
        } else {
            f64::NAN
        };

        Ok(PerformanceReport {
            start_date: first.date,
            end_date: last.date,
            initial_equity: first.equity,
            final_equity: last.equity,
            periods,
            total_return,
            cagr,
            max_drawdown: max_drawdown(&values),
            annualized_volatility,
            risk_adjusted_return,
            rebalance_count: 0,
            turnover_initial: 0.0,
            turnover_avg_equity: 0.0,
            exposure: 0.0,
        })
    }

    //full report of a backtest, including rebalance turnover and exposure
    pub fn from_backtest(result: &BacktestResult, periods_per_year: usize) -> Result<Self> {
        let mut report = Self::evaluate(&result.equity_curve, periods_per_year)?;

        let traded_notional: f64 = result.rebalances.iter().map(|r| r.notional()).sum();
        let values = result.equity_curve.values();
        let average_equity = values.iter().sum::<f64>() / values.len() as f64;

        let risk_days = result
            .holdings
            .iter()
            .filter(|(_, asset)| *asset == Asset::Risk)
            .count();

        report.rebalance_count = result.rebalances.len();
        report.turnover_initial = traded_notional / result.initial_capital;
        report.turnover_avg_equity = traded_notional / average_equity;
        report.exposure = if result.holdings.is_empty() {
            0.0
        } else {
            risk_days as f64 / result.holdings.len() as f64
        };

        Ok(report)
    }

    //prints metrics in a formatted table
    pub fn pretty_print_table(&self) {
        self.to_table().printstd();
    }

    pub fn to_table(&self) -> Table {
        let mut table = Table::new();

        table.add_row(Row::new(vec![Cell::new("Metric"), Cell::new("Value")]));

        let rows = [
            (
                "Period",
                format!("{} to {} ({} days)", self.start_date, self.end_date, self.periods),
            ),
            ("Initial Equity", format!("${:.2}", self.initial_equity)),
            ("Final Equity", format!("${:.2}", self.final_equity)),
            ("Total Return", format!("{:.2}%", self.total_return * 100.0)),
            ("CAGR", format!("{:.2}%", self.cagr * 100.0)),
            ("Max Drawdown", format!("{:.2}%", self.max_drawdown * 100.0)),
            (
                "Annualized Volatility",
                format!("{:.2}%", self.annualized_volatility * 100.0),
            ),
            ("Risk-Adjusted Return", format_ratio(self.risk_adjusted_return)),
            ("Rebalances", format!("{}", self.rebalance_count)),
            ("Turnover (Initial)", format!("{:.4}", self.turnover_initial)),
            ("Turnover (Avg Equity)", format!("{:.4}", self.turnover_avg_equity)),
            ("Exposure", format!("{:.2}%", self.exposure * 100.0)),
        ];

        for (name, value) in rows {
            table.add_row(Row::new(vec![Cell::new(name), Cell::new(&value)]));
        }

        table
    }
}

pub fn format_ratio(value: f64) -> String {
    if value.is_nan() {
        "n/a".to_string()
    } else {
        format!("{:.3}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::calendar::weekdays_from;
    use crate::metrics::timeseries::EquityPoint;
    use approx::assert_relative_eq;

    fn curve(values: &[f64]) -> EquityCurve {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let points = weekdays_from(start, values.len())
            .into_iter()
            .zip(values.iter())
            .map(|(date, &equity)| EquityPoint::new(date, equity))
            .collect();
        EquityCurve::from_points(points).unwrap()
    }

    #[test]
    fn single_point_is_empty_curve() {
        let err = PerformanceReport::evaluate(&curve(&[1.0]), 252).unwrap_err();
        assert_eq!(err, BacktestError::EmptyCurve { points: 1 });
    }

    #[test]
    fn flat_year_has_zero_return_and_nan_ratio() {
        let report = PerformanceReport::evaluate(&curve(&[1.0; 253]), 252).unwrap();

        assert_eq!(report.periods, 252);
        assert_eq!(report.total_return, 0.0);
        assert_eq!(report.cagr, 0.0);
        assert_eq!(report.max_drawdown, 0.0);
        assert_eq!(report.annualized_volatility, 0.0);
        assert!(report.risk_adjusted_return.is_nan());
    }

    #[test]
    fn doubling_over_one_year_is_hundred_percent_cagr() {
        let values: Vec<f64> = (0..=252).map(|i| 2f64.powf(i as f64 / 252.0)).collect();
        let report = PerformanceReport::evaluate(&curve(&values), 252).unwrap();

        assert_relative_eq!(report.total_return, 1.0, max_relative = 1e-12);
        assert_relative_eq!(report.cagr, 1.0, max_relative = 1e-12);
        //constant log growth
        assert_relative_eq!(report.annualized_volatility, 0.0, epsilon = 1e-10);
    }

    #[test]
    fn half_year_annualizes() {
        let values = [100.0, 110.0];
        let report = PerformanceReport::evaluate(&curve(&values), 2).unwrap();
        assert_relative_eq!(report.cagr, 1.1f64.powi(2) - 1.0, max_relative = 1e-12);
    }

    #[test]
    fn drawdown_and_volatility() {
        let values = [100.0, 120.0, 90.0, 110.0];
        let report = PerformanceReport::evaluate(&curve(&values), 252).unwrap();

        assert_relative_eq!(report.max_drawdown, -0.25);

        let logs = [1.2f64.ln(), 0.75f64.ln(), (110.0f64 / 90.0).ln()];
        let mean = logs.iter().sum::<f64>() / 3.0;
        let var = logs.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / 3.0;
        assert_relative_eq!(
            report.annualized_volatility,
            var.sqrt() * 252f64.sqrt(),
            max_relative = 1e-10
        );
        assert_relative_eq!(
            report.risk_adjusted_return,
            report.cagr / report.annualized_volatility,
            max_relative = 1e-12
        );
    }

    #[test]
    fn table_shows_na_for_undefined_ratio() {
        let report = PerformanceReport::evaluate(&curve(&[1.0, 1.0]), 252).unwrap();
        assert_eq!(format_ratio(report.risk_adjusted_return), "n/a");
        assert_eq!(report.to_table().len(), 13);
    }
}
