//! Execution sink port trait.

use crate::domain::order::OrderReason;
use chrono::NaiveDate;

/// Fire-and-forget order sink plus the holdings view the engine needs.
pub trait ExecutionPort {
    /// Called by the day loop before any order of that day.
    fn begin_day(&mut self, _date: NaiveDate) {}

    fn liquidate(&mut self, symbol: &str, reason: OrderReason);

    fn set_target_weight(&mut self, symbol: &str, weight: f64, reason: OrderReason);

    fn is_invested(&self, symbol: &str) -> bool;

    /// Currently invested symbols, sorted.
    fn invested(&self) -> Vec<String>;
}
