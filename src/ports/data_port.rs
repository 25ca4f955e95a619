//! Data access port traits.

use crate::domain::error::LowvolError;
use crate::domain::record::{DailyRecord, PricePoint};
use chrono::NaiveDate;

pub trait DataPort {
    /// Universe rows between the two dates inclusive, sorted by date.
    fn fetch_universe(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<DailyRecord>, LowvolError>;

    /// Bond price series between the two dates inclusive, sorted by date.
    fn fetch_bond(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PricePoint>, LowvolError>;

    fn list_symbols(&self) -> Result<Vec<String>, LowvolError>;

    fn get_data_range(&self) -> Result<Option<(NaiveDate, NaiveDate, usize)>, LowvolError>;
}

/// Historical closes used to warm up a new tracker.
pub trait HistoryPort {
    /// Up to `count` closes on or before `as_of`, oldest first.
    fn history(
        &self,
        symbol: &str,
        as_of: NaiveDate,
        count: usize,
    ) -> Result<Vec<f64>, LowvolError>;
}
