use crate::engine::BacktestResult;
use crate::metrics::summary::format_ratio;
use crate::metrics::PerformanceReport;
use crate::pipeline::RotationOutcome;
use crate::research::SweepReport;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;

//number of trailing equity points in the decision record
const RECORD_TAIL: usize = 10;

#[derive(Serialize)]
struct EquityRow {
    date: NaiveDate,
    equity: f64,
    drawdown: f64,
    asset: String,
}

//writes the equity curve with drawdown and held asset per day
pub fn write_equity_csv<P: AsRef<Path>>(result: &BacktestResult, path: P) -> Result<()> {
    let path = path.as_ref();
    let mut writer =
        csv::Writer::from_path(path).context(format!("Failed to create {:?}", path))?;

    let values = result.equity_curve.values();
    let drawdowns = crate::metrics::timeseries::drawdown_series(&values);

    for ((point, drawdown), (_, asset)) in result
        .equity_curve
        .points()
        .iter()
        .zip(drawdowns)
        .zip(&result.holdings)
    {
        writer.serialize(EquityRow {
            date: point.date,
            equity: point.equity,
            drawdown,
            asset: asset.to_string(),
        })?;
    }

    writer.flush()?;
    Ok(())
}

//writes one row per change of held asset
pub fn write_rebalances_csv<P: AsRef<Path>>(result: &BacktestResult, path: P) -> Result<()> {
    let path = path.as_ref();
    let mut writer =
        csv::Writer::from_path(path).context(format!("Failed to create {:?}", path))?;

    for rebalance in &result.rebalances {
        writer.serialize(rebalance)?;
    }

    writer.flush()?;
    Ok(())
}

//markdown summary of one run
pub fn decision_record(outcome: &RotationOutcome) -> String {
    let config = &outcome.config;
    let report = &outcome.report;
    let result = &outcome.backtest;

    let mut out = String::new();
    let _ = writeln!(out, "# Decision Record\n");
    let _ = writeln!(out, "## Configuration");
    let _ = writeln!(out, "- Assets: {}, {}", config.risk_ticker, config.cash_ticker);
    let _ = writeln!(out, "- SMA Window: {}", config.sma_window);
    let _ = writeln!(out, "- Cost (bps per side): {}", config.cost_bps);
    let _ = writeln!(out, "- Initial Capital: {:.2}", config.initial_capital);
    let _ = writeln!(
        out,
        "- Date Range: {} to {}\n",
        report.start_date, report.end_date
    );

    let _ = writeln!(out, "## Summary Metrics");
    write_metrics(&mut out, report);
    out.push('\n');

    let _ = writeln!(out, "## Monthly Decisions");
    let _ = writeln!(out, "| Month End | Effective | Close | SMA | Asset |");
    let _ = writeln!(out, "| --- | --- | --- | --- | --- |");
    for decision in &result.decisions {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} | {} |",
            decision.month_end,
            decision
                .effective_date
                .map_or_else(|| "-".to_string(), |d| d.to_string()),
            decision
                .close
                .map_or_else(|| "-".to_string(), |c| format!("{:.2}", c)),
            decision
                .sma
                .map_or_else(|| "warm-up".to_string(), |s| format!("{:.2}", s)),
            decision.asset
        );
    }
    out.push('\n');

    let _ = writeln!(out, "## Rebalances");
    let _ = writeln!(out, "| Date | From | To | Cost |");
    let _ = writeln!(out, "| --- | --- | --- | --- |");
    for rebalance in &result.rebalances {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {:.2} |",
            rebalance.date, rebalance.from, rebalance.to, rebalance.cost_amount
        );
    }
    out.push('\n');

    let _ = writeln!(out, "## Last {} Equity Points", RECORD_TAIL);
    let _ = writeln!(out, "| Date | Value |");
    let _ = writeln!(out, "| --- | --- |");
    let points = result.equity_curve.points();
    for point in &points[points.len().saturating_sub(RECORD_TAIL)..] {
        let _ = writeln!(out, "| {} | {:.2} |", point.date, point.equity);
    }

    out
}

pub fn write_decision_record<P: AsRef<Path>>(outcome: &RotationOutcome, path: P) -> Result<()> {
    let path = path.as_ref();
    std::fs::write(path, decision_record(outcome))
        .context(format!("Failed to write decision record {:?}", path))
}

//markdown comparison of a window sweep
pub fn research_report(sweep: &SweepReport, qa_warnings: &[String]) -> String {
    let config = &sweep.base_config;
    let windows: Vec<String> = sweep.results.keys().map(|w| w.to_string()).collect();

    let mut out = String::new();
    let _ = writeln!(out, "# Research Report\n");
    let _ = writeln!(out, "## Configuration");
    let _ = writeln!(out, "- Assets: {}, {}", config.risk_ticker, config.cash_ticker);
    let _ = writeln!(out, "- Windows: {}", windows.join(", "));
    let _ = writeln!(out, "- Cost (bps per side): {}", config.cost_bps);
    if let Some(first) = sweep.results.values().next() {
        let _ = writeln!(out, "- Date Range: {} to {}", first.start_date, first.end_date);
    }
    out.push('\n');

    let _ = writeln!(out, "## Robustness Verdict");
    let _ = writeln!(out, "- Verdict: {}", sweep.verdict());
    if !sweep.reasons.is_empty() {
        let _ = writeln!(out, "- Reasons:");
        for reason in &sweep.reasons {
            let _ = writeln!(out, "  - {}", reason);
        }
    }
    out.push('\n');

    let _ = writeln!(out, "## Summary Table");
    let _ = writeln!(
        out,
        "| Window | CAGR | Max Drawdown | Volatility | Risk-Adjusted | Turnover (Avg Eq) | Rebalances | Final Value |"
    );
    let _ = writeln!(out, "| --- | --- | --- | --- | --- | --- | --- | --- |");
    for (window, report) in &sweep.results {
        let _ = writeln!(
            out,
            "| {} | {:.4} | {:.4} | {:.4} | {} | {:.4} | {} | {:.2} |",
            window,
            report.cagr,
            report.max_drawdown,
            report.annualized_volatility,
            format_ratio(report.risk_adjusted_return),
            report.turnover_avg_equity,
            report.rebalance_count,
            report.final_equity
        );
    }
    out.push('\n');

    let _ = writeln!(out, "## QA Warnings");
    if qa_warnings.is_empty() {
        let _ = writeln!(out, "- None");
    }
    for warning in qa_warnings {
        let _ = writeln!(out, "- {}", warning);
    }

    out
}

pub fn write_research_report<P: AsRef<Path>>(
    sweep: &SweepReport,
    qa_warnings: &[String],
    path: P,
) -> Result<()> {
    let path = path.as_ref();
    std::fs::write(path, research_report(sweep, qa_warnings))
        .context(format!("Failed to write research report {:?}", path))
}

fn write_metrics(out: &mut String, report: &PerformanceReport) {
    let _ = writeln!(out, "- CAGR: {:.4}", report.cagr);
    let _ = writeln!(out, "- Max Drawdown: {:.4}", report.max_drawdown);
    let _ = writeln!(out, "- Volatility: {:.4}", report.annualized_volatility);
    let _ = writeln!(
        out,
        "- Risk-Adjusted Return: {}",
        format_ratio(report.risk_adjusted_return)
    );
    let _ = writeln!(out, "- Rebalances: {}", report.rebalance_count);
    let _ = writeln!(out, "- Turnover (initial): {:.4}", report.turnover_initial);
    let _ = writeln!(out, "- Final Value: {:.2}", report.final_equity);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RotationConfig;
    use crate::data::calendar::weekdays_from;
    use crate::data::PriceSeries;
    use crate::pipeline::run_pipeline;
    use crate::research::run_sweep;

    fn inputs() -> (PriceSeries, PriceSeries) {
        let days = weekdays_from(NaiveDate::from_ymd_opt(2021, 1, 4).unwrap(), 120);
        let risk = PriceSeries::from_pairs(
            "SPY",
            days.iter()
                .enumerate()
                .map(|(i, d)| (*d, 100.0 + (i as f64 / 8.0).sin() * 4.0)),
        )
        .unwrap();
        let cash = PriceSeries::from_pairs(
            "BIL",
            days.iter().enumerate().map(|(i, d)| (*d, 10.0 + i as f64 * 0.001)),
        )
        .unwrap();
        (risk, cash)
    }

    fn outcome() -> RotationOutcome {
        let (risk, cash) = inputs();
        let config = RotationConfig {
            cost_bps: 5.0,
            ..RotationConfig::default().with_window(20)
        };
        run_pipeline(&risk, &cash, &config).unwrap()
    }

    #[test]
    fn decision_record_lists_every_month_end() {
        let outcome = outcome();
        let record = decision_record(&outcome);

        assert!(record.starts_with("# Decision Record"));
        assert!(record.contains("- SMA Window: 20"));
        for decision in &outcome.backtest.decisions {
            assert!(record.contains(&format!("| {} |", decision.month_end)));
        }
        assert!(record.contains("## Last 10 Equity Points"));
    }

    #[test]
    fn equity_csv_has_one_row_per_day() {
        let outcome = outcome();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("equity.csv");

        write_equity_csv(&outcome.backtest, &path).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.iter().collect::<Vec<_>>(), vec!["date", "equity", "drawdown", "asset"]);

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), outcome.backtest.equity_curve.len());

        let last = rows.last().unwrap();
        let date: NaiveDate = last[0].parse().unwrap();
        let equity: f64 = last[1].parse().unwrap();
        assert_eq!(outcome.backtest.equity_curve.equity_on(date), Some(equity));
    }

    #[test]
    fn rebalances_csv_round_trips_through_serde() {
        let outcome = outcome();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rebalances.csv");

        write_rebalances_csv(&outcome.backtest, &path).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let rows: Vec<crate::engine::Rebalance> =
            reader.deserialize().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), outcome.backtest.rebalances.len());
        if let (Some(read), Some(original)) = (rows.first(), outcome.backtest.rebalances.first()) {
            assert_eq!(read.date, original.date);
            assert_eq!(read.to, original.to);
        }
    }

    #[test]
    fn research_report_contains_verdict_and_warnings() {
        let (risk, cash) = inputs();
        let sweep = run_sweep(&risk, &cash, &RotationConfig::default(), &[10, 20], None).unwrap();
        let warnings = vec!["SPY has 12 consecutive identical closes".to_string()];

        let text = research_report(&sweep, &warnings);
        assert!(text.contains(&format!("- Verdict: {}", sweep.verdict())));
        assert!(text.contains("- Windows: 10, 20"));
        assert!(text.contains("| 10 |"));
        assert!(text.contains("- SPY has 12 consecutive identical closes"));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("research.md");
        write_research_report(&sweep, &warnings, &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), text);
    }
}
