use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use prettytable::{Cell, Row, Table};
use sentinel::data::calendar::weekdays_from;
use sentinel::data::qa;
use sentinel::prelude::*;
use sentinel::report;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sentinel")]
#[command(about = "A 200-day SMA trend rotation backtester", long_about = None)]
struct Cli {
    //log at debug level unless RUST_LOG says otherwise
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    //run a single backtest
    Run {
        #[command(flatten)]
        data: DataArgs,

        //sma window
        #[arg(long)]
        window: Option<usize>,

        //run configuration json, overrides the data flags; output flags still apply
        #[arg(long)]
        config: Option<PathBuf>,

        //output path for equity curve csv
        #[arg(long)]
        output_equity_csv: Option<PathBuf>,

        //output path for rebalances csv
        #[arg(long)]
        output_rebalances_csv: Option<PathBuf>,

        //output path for markdown decision record
        #[arg(long)]
        output_record: Option<PathBuf>,
    },
    //compare several sma windows in parallel
    Sweep {
        #[command(flatten)]
        data: DataArgs,

        //windows to compare
        #[arg(long, value_delimiter = ',', default_value = "180,200,220")]
        windows: Vec<usize>,

        //output path for markdown research report
        #[arg(long)]
        output_report: Option<PathBuf>,
    },
    //run on synthetic flat-then-rising prices
    Demo {
        //initial capital
        #[arg(long, default_value = "100000")]
        initial_capital: f64,
    },
}

#[derive(Args)]
struct DataArgs {
    //path to risk asset csv (date, close)
    #[arg(long)]
    risk_data: Option<PathBuf>,

    //path to cash asset csv (date, close)
    #[arg(long)]
    cash_data: Option<PathBuf>,

    //risk ticker
    #[arg(long, default_value = "SPY")]
    risk_ticker: String,

    //cash ticker
    #[arg(long, default_value = "BIL")]
    cash_ticker: String,

    //initial capital
    #[arg(long, default_value = "100000")]
    initial_capital: f64,

    //cost per side in basis points
    #[arg(long, default_value = "0")]
    cost_bps: f64,
}

impl DataArgs {
    fn rotation_config(&self) -> RotationConfig {
        RotationConfig {
            risk_ticker: self.risk_ticker.clone(),
            cash_ticker: self.cash_ticker.clone(),
            initial_capital: self.initial_capital,
            cost_bps: self.cost_bps,
            ..RotationConfig::default()
        }
    }

    fn paths(&self) -> Result<(PathBuf, PathBuf)> {
        let risk = self
            .risk_data
            .clone()
            .ok_or_else(|| anyhow::anyhow!("--risk-data is required"))?;
        let cash = self
            .cash_data
            .clone()
            .ok_or_else(|| anyhow::anyhow!("--cash-data is required"))?;
        Ok((risk, cash))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Run {
            data,
            window,
            config,
            output_equity_csv,
            output_rebalances_csv,
            output_record,
        } => {
            let run_config = match config {
                Some(path) => RunConfiguration::from_json_file(&path)?.with_outputs(
                    output_equity_csv,
                    output_rebalances_csv,
                    output_record,
                ),
                None => {
                    let (risk_data_path, cash_data_path) = data.paths()?;
                    RunConfiguration {
                        risk_data_path,
                        cash_data_path,
                        rotation: data.rotation_config(),
                        output_equity_csv,
                        output_rebalances_csv,
                        output_decision_record: output_record,
                    }
                }
            };
            run_backtest(run_config, window)?;
        }
        Commands::Sweep {
            data,
            windows,
            output_report,
        } => {
            run_research(&data, &windows, output_report)?;
        }
        Commands::Demo { initial_capital } => {
            run_demo(initial_capital)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

//loads both csv files and restricts them to their shared trading days
fn load_aligned(
    risk_path: &Path,
    cash_path: &Path,
    config: &RotationConfig,
) -> Result<(PriceSeries, PriceSeries, Vec<String>)> {
    let risk_raw = load_price_csv(risk_path, &config.risk_ticker)
        .context(format!("Failed to load data from {:?}", risk_path))?;
    let cash_raw = load_price_csv(cash_path, &config.cash_ticker)
        .context(format!("Failed to load data from {:?}", cash_path))?;

    let (risk, cash) = align(&risk_raw, &cash_raw);
    if risk.is_empty() {
        anyhow::bail!(
            "No common trading days between {} and {}",
            config.risk_ticker,
            config.cash_ticker
        );
    }

    let days: Vec<NaiveDate> = risk.dates().collect();
    let warnings = qa::run_checks(&[(&risk_raw, &risk), (&cash_raw, &cash)], &days);

    info!(
        days = days.len(),
        start = %days[0],
        end = %days[days.len() - 1],
        "aligned price data"
    );

    Ok((risk, cash, warnings))
}

fn run_backtest(run_config: RunConfiguration, window: Option<usize>) -> Result<()> {
    let mut config = run_config.rotation.clone();
    if let Some(window) = window {
        config.sma_window = window;
    }

    let (risk, cash, warnings) =
        load_aligned(&run_config.risk_data_path, &run_config.cash_data_path, &config)?;

    let outcome = run_pipeline(&risk, &cash, &config)?;
    print_outcome(&outcome, &warnings);

    if let Some(path) = &run_config.output_equity_csv {
        report::write_equity_csv(&outcome.backtest, path)?;
        println!("\nEquity curve saved to {:?}", path);
    }
    if let Some(path) = &run_config.output_rebalances_csv {
        report::write_rebalances_csv(&outcome.backtest, path)?;
        println!("Rebalances saved to {:?}", path);
    }
    if let Some(path) = &run_config.output_decision_record {
        report::write_decision_record(&outcome, path)?;
        println!("Decision record saved to {:?}", path);
    }

    Ok(())
}

fn run_research(data: &DataArgs, windows: &[usize], output: Option<PathBuf>) -> Result<()> {
    let config = data.rotation_config();
    let (risk_path, cash_path) = data.paths()?;

    let (risk, cash, warnings) = load_aligned(&risk_path, &cash_path, &config)?;
    let sweep = run_sweep(&risk, &cash, &config, windows, None)?;

    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("Window"),
        Cell::new("CAGR"),
        Cell::new("Max Drawdown"),
        Cell::new("Volatility"),
        Cell::new("Rebalances"),
        Cell::new("Final Equity"),
    ]));
    for (window, report) in &sweep.results {
        table.add_row(Row::new(vec![
            Cell::new(&window.to_string()),
            Cell::new(&format!("{:.2}%", report.cagr * 100.0)),
            Cell::new(&format!("{:.2}%", report.max_drawdown * 100.0)),
            Cell::new(&format!("{:.2}%", report.annualized_volatility * 100.0)),
            Cell::new(&report.rebalance_count.to_string()),
            Cell::new(&format!("${:.2}", report.final_equity)),
        ]));
    }
    table.printstd();

    println!("\nVerdict: {}", sweep.verdict());
    for reason in &sweep.reasons {
        println!("  - {}", reason);
    }

    if let Some(path) = output {
        report::write_research_report(&sweep, &warnings, &path)?;
        println!("Research report saved to {:?}", path);
    }

    Ok(())
}

fn run_demo(initial_capital: f64) -> Result<()> {
    //flat for 260 days, then a steady climb; cash accrues slowly throughout
    let days = weekdays_from(
        NaiveDate::from_ymd_opt(2021, 1, 4).context("invalid demo start date")?,
        756,
    );
    let risk = PriceSeries::from_pairs(
        "SPY",
        days.iter().enumerate().map(|(i, day)| {
            let close = if i < 260 {
                100.0
            } else {
                100.0 + (i - 259) as f64 * 1.5
            };
            (*day, close)
        }),
    )?;
    let cash = PriceSeries::from_pairs(
        "BIL",
        days.iter()
            .enumerate()
            .map(|(i, day)| (*day, 100.0 + i as f64 * 0.05)),
    )?;

    let config = RotationConfig {
        initial_capital,
        ..RotationConfig::default()
    };
    let outcome = run_pipeline(&risk, &cash, &config)?;
    print_outcome(&outcome, &[]);

    Ok(())
}

fn print_outcome(outcome: &RotationOutcome, warnings: &[String]) {
    let config = &outcome.config;
    println!("Sentinel Trend Rotation");
    println!("=======================\n");
    println!(
        "Risk: {} | Cash: {} | SMA window: {} | Cost: {} bps/side\n",
        config.risk_ticker, config.cash_ticker, config.sma_window, config.cost_bps
    );

    outcome.report.pretty_print_table();

    if let Some(last) = outcome.backtest.decisions.last() {
        println!(
            "\nLatest decision ({}): {}",
            last.month_end,
            match last.asset {
                Asset::Risk => &config.risk_ticker,
                Asset::Cash => &config.cash_ticker,
            }
        );
    }

    for warning in warnings {
        println!("QA: {}", warning);
    }
}
