//! Report generation port trait.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::LowvolError;
use crate::domain::order::OrderRecord;

/// Port for writing backtest reports.
pub trait ReportPort {
    fn write(
        &self,
        result: &BacktestResult,
        orders: &[OrderRecord],
        output_path: &str,
    ) -> Result<(), LowvolError>;
}
