//! CSV report adapter implementing ReportPort.
//!
//! Writes the order log to the requested path and a key/value run summary
//! beside it as `<stem>_summary.csv`.

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::backtest::BacktestResult;
use crate::domain::error::LowvolError;
use crate::domain::order::{OrderAction, OrderRecord};
use crate::ports::report_port::ReportPort;

#[derive(Debug, Default)]
pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        Self
    }

    /// Path of the summary file written alongside `output_path`.
    pub fn summary_path(output_path: &Path) -> PathBuf {
        let stem = output_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "orders".to_string());
        output_path.with_file_name(format!("{}_summary.csv", stem))
    }
}

fn csv_err(e: csv::Error) -> LowvolError {
    LowvolError::Io(std::io::Error::other(e.to_string()))
}

fn write_orders(path: &Path, orders: &[OrderRecord]) -> Result<(), LowvolError> {
    let mut wtr = csv::Writer::from_path(path).map_err(csv_err)?;
    wtr.write_record(["date", "symbol", "action", "weight", "reason"])
        .map_err(csv_err)?;
    for order in orders {
        let action = match order.action {
            OrderAction::Liquidate => "liquidate",
            OrderAction::TargetWeight(_) => "target",
        };
        wtr.write_record([
            order.date.format("%Y-%m-%d").to_string(),
            order.symbol.clone(),
            action.to_string(),
            format!("{:.6}", order.weight()),
            order.reason.to_string(),
        ])
        .map_err(csv_err)?;
    }
    wtr.flush()?;
    Ok(())
}

fn write_summary(path: &Path, result: &BacktestResult) -> Result<(), LowvolError> {
    let mut wtr = csv::Writer::from_path(path).map_err(csv_err)?;
    let rows = [
        ("trading_days", result.trading_days.to_string()),
        ("rebalances", result.rebalances.len().to_string()),
        ("drawdown_exits", result.exits.len().to_string()),
        ("inconsistencies", result.inconsistencies.len().to_string()),
        ("trackers", result.trackers.to_string()),
        ("excluded", result.excluded.join(" ")),
    ];
    wtr.write_record(["key", "value"]).map_err(csv_err)?;
    for (key, value) in rows {
        wtr.write_record([key, value.as_str()]).map_err(csv_err)?;
    }
    wtr.flush()?;
    Ok(())
}

impl ReportPort for CsvReportAdapter {
    fn write(
        &self,
        result: &BacktestResult,
        orders: &[OrderRecord],
        output_path: &str,
    ) -> Result<(), LowvolError> {
        let path = Path::new(output_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        write_orders(path, orders)?;
        write_summary(&Self::summary_path(path), result)?;
        tracing::info!(path = %path.display(), orders = orders.len(), "report written");
        Ok(())
    }
}
