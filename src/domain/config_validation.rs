//! Configuration validation.
//!
//! Validates all config fields before a backtest runs.

use crate::domain::config::StrategyConfig;
use crate::domain::error::LowvolError;
use crate::domain::tracker::MOMENTUM_SKIP;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), LowvolError> {
    validate_dates(config)?;
    validate_file(config, "universe_file")?;
    validate_file(config, "bond_file")?;
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), LowvolError> {
    let defaults = StrategyConfig::default();
    validate_period(config, defaults.period)?;
    validate_fine_count(config, defaults.fine_count)?;
    validate_exit_thresh(config, defaults.exit_thresh)?;
    validate_reenter_thresh(config, defaults.reenter_thresh)?;
    validate_market_cap_band(config, &defaults)?;
    validate_leverage(config, defaults.leverage)?;
    validate_non_empty(config, "market")?;
    validate_non_empty(config, "bond_symbol")?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: &str) -> LowvolError {
    LowvolError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), LowvolError> {
    let start_str = config.get_string("backtest", "start_date");
    let end_str = config.get_string("backtest", "end_date");

    let start_date = parse_date(start_str.as_deref(), "start_date")?;
    let end_date = parse_date(end_str.as_deref(), "end_date")?;

    if start_date >= end_date {
        return Err(invalid(
            "backtest",
            "start_date",
            "start_date must be before end_date",
        ));
    }
    Ok(())
}

pub fn parse_date(value: Option<&str>, field: &str) -> Result<NaiveDate, LowvolError> {
    match value {
        None => Err(LowvolError::ConfigMissing {
            section: "backtest".to_string(),
            key: field.to_string(),
        }),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
            invalid(
                "backtest",
                field,
                &format!("invalid {} format, expected YYYY-MM-DD", field),
            )
        }),
    }
}

fn validate_file(config: &dyn ConfigPort, key: &str) -> Result<(), LowvolError> {
    match config.get_string("backtest", key) {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(LowvolError::ConfigMissing {
            section: "backtest".to_string(),
            key: key.to_string(),
        }),
    }
}

fn validate_period(config: &dyn ConfigPort, default: usize) -> Result<(), LowvolError> {
    let value = config.get_int("strategy", "period", default as i64);
    if value <= MOMENTUM_SKIP as i64 {
        return Err(invalid(
            "strategy",
            "period",
            &format!("period must be greater than {}", MOMENTUM_SKIP),
        ));
    }
    Ok(())
}

fn validate_fine_count(config: &dyn ConfigPort, default: usize) -> Result<(), LowvolError> {
    let value = config.get_int("strategy", "fine_count", default as i64);
    if value < 1 {
        return Err(invalid("strategy", "fine_count", "fine_count must be at least 1"));
    }
    Ok(())
}

fn validate_exit_thresh(config: &dyn ConfigPort, default: f64) -> Result<(), LowvolError> {
    let value = config.get_double("strategy", "exit_thresh", default);
    if value <= 0.0 || value >= 1.0 {
        return Err(invalid(
            "strategy",
            "exit_thresh",
            "exit_thresh must be between 0 and 1",
        ));
    }
    Ok(())
}

fn validate_reenter_thresh(config: &dyn ConfigPort, default: f64) -> Result<(), LowvolError> {
    let value = config.get_double("strategy", "reenter_thresh", default);
    if value <= 0.0 {
        return Err(invalid(
            "strategy",
            "reenter_thresh",
            "reenter_thresh must be positive",
        ));
    }
    Ok(())
}

fn validate_market_cap_band(
    config: &dyn ConfigPort,
    defaults: &StrategyConfig,
) -> Result<(), LowvolError> {
    let min = config.get_double("strategy", "min_market_cap", defaults.min_market_cap);
    let max = config.get_double("strategy", "max_market_cap", defaults.max_market_cap);
    if min < 0.0 {
        return Err(invalid(
            "strategy",
            "min_market_cap",
            "min_market_cap must be non-negative",
        ));
    }
    if min >= max {
        return Err(invalid(
            "strategy",
            "min_market_cap",
            "min_market_cap must be below max_market_cap",
        ));
    }
    Ok(())
}

fn validate_leverage(config: &dyn ConfigPort, default: f64) -> Result<(), LowvolError> {
    let value = config.get_double("strategy", "leverage", default);
    if value < 1.0 {
        return Err(invalid("strategy", "leverage", "leverage must be at least 1"));
    }
    Ok(())
}

fn validate_non_empty(config: &dyn ConfigPort, key: &str) -> Result<(), LowvolError> {
    match config.get_string("strategy", key) {
        Some(s) if s.trim().is_empty() => Err(invalid(
            "strategy",
            key,
            &format!("{} must not be empty", key),
        )),
        _ => Ok(()),
    }
}
