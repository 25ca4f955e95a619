//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::paper_book::PaperBook;
use crate::domain::backtest::{self as backtest_engine, BacktestConfig, BacktestResult};
use crate::domain::calendar::month_starts;
use crate::domain::config::StrategyConfig;
use crate::domain::config_validation::{
    parse_date, validate_backtest_config, validate_strategy_config,
};
use crate::domain::error::LowvolError;
use crate::domain::feed::FeedStore;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(
    name = "lowvol",
    about = "Low volatility, high momentum mid-cap backtester"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Write the order log (and a run summary beside it) as CSV
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show the data range of the configured feed
    Info {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest { config, output } => run_backtest(&config, output.as_ref()),
        Command::Validate { config } => run_validate(&config),
        Command::Info { config } => run_info(&config),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = LowvolError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

pub fn build_backtest_config(adapter: &dyn ConfigPort) -> Result<BacktestConfig, LowvolError> {
    let start_date = parse_date(
        adapter.get_string("backtest", "start_date").as_deref(),
        "start_date",
    )?;
    let end_date = parse_date(
        adapter.get_string("backtest", "end_date").as_deref(),
        "end_date",
    )?;
    Ok(BacktestConfig {
        start_date,
        end_date,
    })
}

/// Reads the `[strategy]` section, falling back to defaults per key.
pub fn build_strategy_config(adapter: &dyn ConfigPort) -> Result<StrategyConfig, LowvolError> {
    validate_strategy_config(adapter)?;
    let defaults = StrategyConfig::default();

    Ok(StrategyConfig {
        period: adapter.get_int("strategy", "period", defaults.period as i64) as usize,
        fine_count: adapter.get_int("strategy", "fine_count", defaults.fine_count as i64)
            as usize,
        exit_thresh: adapter.get_double("strategy", "exit_thresh", defaults.exit_thresh),
        reenter_thresh: adapter.get_double("strategy", "reenter_thresh", defaults.reenter_thresh),
        min_market_cap: adapter.get_double("strategy", "min_market_cap", defaults.min_market_cap),
        max_market_cap: adapter.get_double("strategy", "max_market_cap", defaults.max_market_cap),
        leverage: adapter.get_double("strategy", "leverage", defaults.leverage),
        market: adapter
            .get_string("strategy", "market")
            .map(|s| s.trim().to_string())
            .unwrap_or(defaults.market),
        bond_symbol: adapter
            .get_string("strategy", "bond_symbol")
            .map(|s| s.trim().to_string())
            .unwrap_or(defaults.bond_symbol),
    })
}

pub fn build_data_adapter(adapter: &dyn ConfigPort) -> Result<CsvAdapter, LowvolError> {
    let path_of = |key: &str| {
        adapter
            .get_string("backtest", key)
            .map(|s| PathBuf::from(s.trim()))
            .ok_or_else(|| LowvolError::ConfigMissing {
                section: "backtest".into(),
                key: key.into(),
            })
    };
    Ok(CsvAdapter::new(path_of("universe_file")?, path_of("bond_file")?))
}

/// Loads the feed for the window plus its warmup and runs the day loop
/// against a fresh paper book.
pub fn execute_backtest(
    data_port: &dyn DataPort,
    strategy: &StrategyConfig,
    bt_config: &BacktestConfig,
) -> Result<(BacktestResult, PaperBook), LowvolError> {
    let load_start = bt_config.warmup_start(strategy.period);
    let records = data_port.fetch_universe(load_start, bt_config.end_date)?;
    if records.is_empty() {
        return Err(LowvolError::NoData {
            symbol: "universe".into(),
        });
    }
    let bond = data_port.fetch_bond(&strategy.bond_symbol, load_start, bt_config.end_date)?;
    let rows = records.len();
    let bond_points = bond.len();

    let feed = FeedStore::new(records, bond);
    let days = feed.timeline().len();
    tracing::info!(
        rows,
        bond_points,
        symbols = feed.symbol_count(),
        days,
        from = %load_start,
        "feed loaded"
    );
    if days < strategy.period {
        return Err(LowvolError::InsufficientData {
            symbol: "universe".into(),
            observations: days,
            minimum: strategy.period,
        });
    }
    let mut book = PaperBook::new(strategy.leverage);
    let result = backtest_engine::run_backtest(&feed, strategy, bt_config, &mut book)?;
    Ok((result, book))
}

fn run_backtest(config_path: &PathBuf, output_path: Option<&PathBuf>) -> ExitCode {
    // Stage 1: Load config
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    // Stage 2: Validate and build configs
    if let Err(e) = validate_backtest_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    let bt_config = match build_backtest_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let strategy = match build_strategy_config(&adapter) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let data_port = match build_data_adapter(&adapter) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Stage 3: Run
    eprintln!(
        "Running backtest: {} to {}, {} names max, bond {}",
        bt_config.start_date, bt_config.end_date, strategy.fine_count, strategy.bond_symbol
    );
    let (result, book) = match execute_backtest(&data_port, &strategy, &bt_config) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Stage 4: Summary
    print_summary(&result, &book);

    // Stage 5: Report
    if let Some(output) = output_path {
        let Some(output_str) = output.to_str() else {
            eprintln!("error: output path is not valid UTF-8");
            return ExitCode::from(1);
        };
        match CsvReportAdapter::new().write(&result, book.orders(), output_str) {
            Ok(()) => eprintln!("\nOrder log written to: {}", output.display()),
            Err(e) => {
                eprintln!("error: failed to write report: {e}");
                return (&e).into();
            }
        }
    }

    ExitCode::SUCCESS
}

fn print_summary(result: &BacktestResult, book: &PaperBook) {
    eprintln!("\n=== Backtest Summary ===");
    eprintln!("Trading Days:     {}", result.trading_days);
    eprintln!("Rebalances:       {}", result.rebalances.len());
    eprintln!("Drawdown Exits:   {}", result.exits.len());
    eprintln!("Still Excluded:   {}", result.excluded.len());
    eprintln!("Trackers:         {}", result.trackers);
    eprintln!("Orders:           {}", book.orders().len());
    eprintln!("Gross Exposure:   {:.2}", book.gross_exposure());

    if !result.inconsistencies.is_empty() {
        eprintln!(
            "\nwarning: {} reconciliation inconsistencies",
            result.inconsistencies.len()
        );
        for event in &result.inconsistencies {
            eprintln!("  {} {}", event.date, event.symbol);
        }
    }

    if !book.weights().is_empty() {
        eprintln!("\n=== Final Holdings ===");
        for (symbol, weight) in book.weights() {
            eprintln!("  {:<10} {:>8.4}", symbol, weight);
        }
    }
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_backtest_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    let strategy = match build_strategy_config(&adapter) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!("\nStrategy parameters:");
    eprintln!("  period:         {}", strategy.period);
    eprintln!("  fine_count:     {}", strategy.fine_count);
    eprintln!("  exit_thresh:    {}", strategy.exit_thresh);
    eprintln!("  reenter_thresh: {}", strategy.reenter_thresh);
    eprintln!(
        "  market cap:     {:.0} to {:.0}",
        strategy.min_market_cap, strategy.max_market_cap
    );
    eprintln!("  leverage:       {}", strategy.leverage);
    eprintln!("  market:         {}", strategy.market);
    eprintln!("  bond_symbol:    {}", strategy.bond_symbol);

    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

fn run_info(config_path: &PathBuf) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let data_port = match build_data_adapter(&config) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let symbols = match data_port.list_symbols() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    match data_port.get_data_range() {
        Ok(Some((first, last, days))) => {
            let timeline = match data_port.fetch_universe(first, last) {
                Ok(records) => FeedStore::new(records, Vec::new()).timeline(),
                Err(e) => {
                    eprintln!("error: {e}");
                    return (&e).into();
                }
            };
            println!(
                "universe: {} symbols, {} trading days, {} to {}",
                symbols.len(),
                days,
                first,
                last
            );
            println!("month starts: {}", month_starts(&timeline).len());
            ExitCode::SUCCESS
        }
        Ok(None) => {
            eprintln!("universe: no data found");
            (&LowvolError::NoData {
                symbol: "universe".into(),
            })
                .into()
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}
