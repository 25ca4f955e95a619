//! CLI integration tests for config building and command dispatch.
//!
//! Tests cover:
//! - Config parsing (build_backtest_config, build_strategy_config)
//! - Data adapter wiring from config paths
//! - validate, info and backtest commands against real files on disk

mod common;

use clap::Parser;
use common::*;
use lowvol::adapters::file_config_adapter::FileConfigAdapter;
use lowvol::cli::{self, Cli};
use lowvol::domain::error::LowvolError;
use lowvol::domain::order::OrderReason;
use lowvol::ports::data_port::DataPort;
use lowvol::ports::execution_port::ExecutionPort;
use std::fmt::Write as _;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tempfile::TempDir;

fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn same_code(actual: ExitCode, expected: ExitCode) -> bool {
    format!("{:?}", actual) == format!("{:?}", expected)
}

const VALID_INI: &str = r#"
[backtest]
start_date = 2020-03-01
end_date = 2020-05-29
universe_file = data/universe.csv
bond_file = data/CME_TY1.csv

[strategy]
period = 30
fine_count = 10
exit_thresh = 0.10
reenter_thresh = 0.25
min_market_cap = 2e9
max_market_cap = 2e10
leverage = 10
market = usa
bond_symbol = CME_TY1
"#;

/// Universe and Quantpedia-style bond files for eight flat names.
fn write_feed(dir: &Path) -> (PathBuf, PathBuf) {
    let days = weekdays(date(2020, 1, 1), date(2020, 5, 29));

    let mut universe =
        String::from("date,symbol,adjusted_price,has_fundamental_data,market,market_cap\n");
    for day in &days {
        for symbol in eight_symbols() {
            writeln!(universe, "{},{},100.0,true,usa,5000000000", day, symbol).unwrap();
        }
    }

    // stamped on the session itself; the reader moves each close to the next
    // calendar day, so Friday closes land on Saturdays
    let mut bond = String::from("Date;back_adjusted;spliced\n");
    for day in &days {
        writeln!(bond, "{};120.0;119.5", day.format("%d.%m.%Y")).unwrap();
    }

    let universe_path = dir.join("universe.csv");
    let bond_path = dir.join("CME_TY1.csv");
    fs::write(&universe_path, universe).unwrap();
    fs::write(&bond_path, bond).unwrap();
    (universe_path, bond_path)
}

fn write_config(dir: &Path, universe: &Path, bond: &Path) -> PathBuf {
    let ini = format!(
        "[backtest]\n\
         start_date = 2020-03-01\n\
         end_date = 2020-05-29\n\
         universe_file = {}\n\
         bond_file = {}\n\
         \n\
         [strategy]\n\
         period = 30\n\
         fine_count = 10\n",
        universe.display(),
        bond.display()
    );
    let path = dir.join("lowvol.ini");
    fs::write(&path, ini).unwrap();
    path
}

mod config_loading {
    use super::*;

    #[test]
    fn build_backtest_config_reads_window() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let config = cli::build_backtest_config(&adapter).unwrap();
        assert_eq!(config.start_date, date(2020, 3, 1));
        assert_eq!(config.end_date, date(2020, 5, 29));
    }

    #[test]
    fn build_backtest_config_missing_end_date() {
        let adapter =
            FileConfigAdapter::from_string("[backtest]\nstart_date = 2020-03-01\n").unwrap();
        let err = cli::build_backtest_config(&adapter).unwrap_err();
        assert!(matches!(err, LowvolError::ConfigMissing { key, .. } if key == "end_date"));
    }

    #[test]
    fn build_strategy_config_reads_every_key() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let strategy = cli::build_strategy_config(&adapter).unwrap();
        assert_eq!(strategy.period, 30);
        assert_eq!(strategy.fine_count, 10);
        assert!((strategy.exit_thresh - 0.10).abs() < f64::EPSILON);
        assert!((strategy.reenter_thresh - 0.25).abs() < f64::EPSILON);
        assert!((strategy.min_market_cap - 2e9).abs() < 1.0);
        assert!((strategy.max_market_cap - 2e10).abs() < 1.0);
        assert!((strategy.leverage - 10.0).abs() < f64::EPSILON);
        assert_eq!(strategy.market, "usa");
        assert_eq!(strategy.bond_symbol, BOND);
    }

    #[test]
    fn build_strategy_config_defaults() {
        let adapter = FileConfigAdapter::from_string("[strategy]\n").unwrap();
        let strategy = cli::build_strategy_config(&adapter).unwrap();
        assert_eq!(strategy, lowvol::domain::config::StrategyConfig::default());
    }

    #[test]
    fn build_strategy_config_rejects_short_period() {
        let adapter = FileConfigAdapter::from_string("[strategy]\nperiod = 20\n").unwrap();
        let err = cli::build_strategy_config(&adapter).unwrap_err();
        assert!(matches!(err, LowvolError::ConfigInvalid { key, .. } if key == "period"));
    }

    #[test]
    fn build_data_adapter_requires_bond_file() {
        let adapter =
            FileConfigAdapter::from_string("[backtest]\nuniverse_file = u.csv\n").unwrap();
        let err = cli::build_data_adapter(&adapter).err().unwrap();
        assert!(matches!(err, LowvolError::ConfigMissing { key, .. } if key == "bond_file"));
    }

    #[test]
    fn load_config_from_disk() {
        let file = write_temp_ini(VALID_INI);
        let adapter = cli::load_config(&file.path().to_path_buf()).unwrap();
        assert!(cli::build_backtest_config(&adapter).is_ok());
    }
}

mod pipeline {
    use super::*;

    #[test]
    fn csv_feed_runs_through_backtest() {
        let dir = TempDir::new().unwrap();
        let (universe, bond) = write_feed(dir.path());
        let config_path = write_config(dir.path(), &universe, &bond);

        let adapter = cli::load_config(&config_path).unwrap();
        let data_port = cli::build_data_adapter(&adapter).unwrap();
        let strategy = cli::build_strategy_config(&adapter).unwrap();
        let window = cli::build_backtest_config(&adapter).unwrap();

        assert_eq!(data_port.list_symbols().unwrap().len(), 8);

        let (result, book) = cli::execute_backtest(&data_port, &strategy, &window).unwrap();
        assert_eq!(result.rebalances.len(), 3);
        assert_eq!(result.rebalances[0].date, date(2020, 3, 3));
        assert!((book.weight("E") - 0.1).abs() < 1e-12);
        assert!((book.weight(BOND) - 0.9).abs() < 1e-12);
    }

    #[test]
    fn saturday_bond_closes_do_not_trade() {
        use chrono::{Datelike, Weekday};

        let dir = TempDir::new().unwrap();
        let (universe, bond) = write_feed(dir.path());
        let config_path = write_config(dir.path(), &universe, &bond);

        let adapter = cli::load_config(&config_path).unwrap();
        let data_port = cli::build_data_adapter(&adapter).unwrap();
        let strategy = cli::build_strategy_config(&adapter).unwrap();
        let window = cli::build_backtest_config(&adapter).unwrap();

        // the bond feed really does carry Saturday dates
        let bond_points = data_port
            .fetch_bond(BOND, date(2020, 5, 2), date(2020, 5, 3))
            .unwrap();
        assert_eq!(bond_points.len(), 1);
        assert_eq!(bond_points[0].date, date(2020, 5, 2));

        let (result, book) = cli::execute_backtest(&data_port, &strategy, &window).unwrap();

        assert_eq!(result.trading_days, 65);
        // 2020-05-01 is a Friday: armed that day, rebalanced the next Monday
        let dates: Vec<_> = result.rebalances.iter().map(|r| r.date).collect();
        assert_eq!(
            dates,
            vec![date(2020, 3, 3), date(2020, 4, 2), date(2020, 5, 4)]
        );
        assert!(dates
            .iter()
            .all(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun)));
        assert!(result
            .rebalances
            .iter()
            .all(|r| r.targeted == vec!["E".to_string()]));

        assert!(book.is_invested("E"));
        assert!((book.weight("E") - 0.1).abs() < 1e-12);
        assert!((book.weight(BOND) - 0.9).abs() < 1e-12);
        assert!(book
            .orders()
            .iter()
            .all(|o| o.reason != OrderReason::RebalanceOut));
    }
}

mod commands {
    use super::*;

    #[test]
    fn validate_accepts_good_config() {
        let file = write_temp_ini(VALID_INI);
        let path = file.path().to_str().unwrap();
        let code = cli::run(Cli::parse_from(["lowvol", "validate", "-c", path]));
        assert!(same_code(code, ExitCode::SUCCESS));
    }

    #[test]
    fn validate_rejects_bad_config() {
        let file = write_temp_ini("[backtest]\nstart_date = 2020-03-01\n");
        let path = file.path().to_str().unwrap();
        let code = cli::run(Cli::parse_from(["lowvol", "validate", "-c", path]));
        assert!(same_code(code, ExitCode::from(2)));
    }

    #[test]
    fn missing_config_file_is_a_config_error() {
        let code = cli::run(Cli::parse_from([
            "lowvol",
            "backtest",
            "-c",
            "/nonexistent/lowvol.ini",
        ]));
        assert!(same_code(code, ExitCode::from(2)));
    }

    #[test]
    fn info_reports_feed() {
        let dir = TempDir::new().unwrap();
        let (universe, bond) = write_feed(dir.path());
        let config_path = write_config(dir.path(), &universe, &bond);
        let code = cli::run(Cli::parse_from([
            "lowvol",
            "info",
            "-c",
            config_path.to_str().unwrap(),
        ]));
        assert!(same_code(code, ExitCode::SUCCESS));
    }

    #[test]
    fn backtest_writes_order_log() {
        let dir = TempDir::new().unwrap();
        let (universe, bond) = write_feed(dir.path());
        let config_path = write_config(dir.path(), &universe, &bond);
        let output = dir.path().join("out/orders.csv");

        let code = cli::run(Cli::parse_from([
            "lowvol",
            "backtest",
            "-c",
            config_path.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ]));
        assert!(same_code(code, ExitCode::SUCCESS));

        let contents = fs::read_to_string(&output).unwrap();
        // header plus bond and E at each of three rebalances
        assert_eq!(contents.lines().count(), 7);
        assert!(dir.path().join("out/orders_summary.csv").exists());
    }

    #[test]
    fn backtest_with_missing_universe_file_is_data_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.csv");
        let config_path = write_config(dir.path(), &missing, &missing);
        let code = cli::run(Cli::parse_from([
            "lowvol",
            "backtest",
            "-c",
            config_path.to_str().unwrap(),
        ]));
        assert!(same_code(code, ExitCode::from(3)));
    }
}
