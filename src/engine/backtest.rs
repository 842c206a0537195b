use crate::config::RotationConfig;
use crate::data::{PriceSeries, SeriesError};
use crate::engine::costs::apply_switch_cost;
use crate::engine::execution::{Asset, MonthlyDecision, Rebalance};
use crate::engine::schedule::monthly_decisions;
use crate::error::{BacktestError, Result};
use crate::metrics::EquityCurve;
use crate::signal::SignalPoint;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

//result of a backtest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    pub initial_capital: f64,
    pub decisions: Vec<MonthlyDecision>,
    pub equity_curve: EquityCurve,
    //asset held at each day's close, the first day holds cash
    pub holdings: Vec<(NaiveDate, Asset)>,
    pub rebalances: Vec<Rebalance>,
}

impl BacktestResult {
    pub fn final_equity(&self) -> f64 {
        self.equity_curve
            .last()
            .map(|p| p.equity)
            .unwrap_or(self.initial_capital)
    }
}

//close prices of both legs on one signal date
#[derive(Debug, Clone, Copy)]
struct DayPrices {
    date: NaiveDate,
    risk: f64,
    cash: f64,
}

impl DayPrices {
    fn close(&self, asset: Asset) -> f64 {
        match asset {
            Asset::Risk => self.risk,
            Asset::Cash => self.cash,
        }
    }
}

//monthly two-asset rotation
//a month-end decision trades at the close of the next trading day, so the new asset's first
//return is the one after that close; before the first decision the portfolio holds cash
#[derive(Debug, Clone)]
pub struct RotationBacktester {
    config: RotationConfig,
}

impl RotationBacktester {
    pub fn new(config: RotationConfig) -> Result<Self> {
        config.validate()?;
        Ok(RotationBacktester { config })
    }

    pub fn config(&self) -> &RotationConfig {
        &self.config
    }

    //runs the rotation over the dates of `risk_signal`
    //both series must have a close on every one of those dates
    pub fn run(
        &self,
        risk_signal: &[SignalPoint],
        risk_series: &PriceSeries,
        cash_series: &PriceSeries,
    ) -> Result<BacktestResult> {
        let first = risk_signal.first().ok_or_else(|| BacktestError::InsufficientData {
            ticker: risk_series.ticker().to_string(),
        })?;

        let prices = self.collect_prices(risk_signal, risk_series, cash_series)?;
        let decisions = monthly_decisions(risk_signal);

        let mut equity = self.config.initial_capital;
        let mut curve = EquityCurve::start(first.date, equity);
        let mut holdings = Vec::with_capacity(prices.len());
        let mut rebalances = Vec::new();

        let mut held = Asset::Cash;
        holdings.push((first.date, held));

        let mut next_decision = 0;

        for window in prices.windows(2) {
            let (prev, today) = (window[0], window[1]);

            //latest decision taken strictly before today
            let mut target = held;
            while let Some(decision) = decisions.get(next_decision) {
                if decision.month_end >= today.date {
                    break;
                }
                target = decision.asset;
                next_decision += 1;
            }

            //the day's return belongs to the asset carried in from the previous close
            equity *= today.close(held) / prev.close(held);

            if target != held {
                let pre_value = equity;
                equity = apply_switch_cost(equity, self.config.cost_bps);

                debug!(
                    date = %today.date,
                    from = %held,
                    to = %target,
                    pre_value,
                    post_value = equity,
                    "rebalance"
                );

                rebalances.push(Rebalance {
                    date: today.date,
                    from: held,
                    to: target,
                    pre_value,
                    post_value: equity,
                    cost_bps: self.config.cost_bps,
                    cost_amount: pre_value - equity,
                });
                held = target;
            }

            curve.push(today.date, equity);
            holdings.push((today.date, held));
        }

        info!(
            risk = risk_series.ticker(),
            cash = cash_series.ticker(),
            window = self.config.sma_window,
            days = curve.len(),
            rebalances = rebalances.len(),
            final_equity = equity,
            "backtest complete"
        );

        Ok(BacktestResult {
            initial_capital: self.config.initial_capital,
            decisions,
            equity_curve: curve,
            holdings,
            rebalances,
        })
    }

    //looks up both closes for every signal date, gaps are fatal
    fn collect_prices(
        &self,
        risk_signal: &[SignalPoint],
        risk_series: &PriceSeries,
        cash_series: &PriceSeries,
    ) -> Result<Vec<DayPrices>> {
        for pair in risk_signal.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(SeriesError::NotIncreasing {
                    previous: pair[0].date,
                    current: pair[1].date,
                }
                .into());
            }
        }

        let lookup = |series: &PriceSeries, date: NaiveDate| {
            series
                .close_on(date)
                .ok_or_else(|| BacktestError::SeriesMismatch {
                    ticker: series.ticker().to_string(),
                    date,
                })
        };

        risk_signal
            .iter()
            .map(|point| -> Result<DayPrices> {
                Ok(DayPrices {
                    date: point.date,
                    risk: lookup(risk_series, point.date)?,
                    cash: lookup(cash_series, point.date)?,
                })
            })
            .collect()
    }
}
