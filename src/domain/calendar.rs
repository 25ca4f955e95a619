//! Month-start trigger over a trading timeline.

use chrono::{Datelike, NaiveDate};

/// True when `date` is the first trading day of its month, given the
/// previous trading day.
pub fn is_month_start(previous: Option<NaiveDate>, date: NaiveDate) -> bool {
    match previous {
        None => true,
        Some(prev) => prev.year() != date.year() || prev.month() != date.month(),
    }
}

/// First trading day of every month in `timeline`.
pub fn month_starts(timeline: &[NaiveDate]) -> Vec<NaiveDate> {
    let mut previous = None;
    let mut starts = Vec::new();
    for &date in timeline {
        if is_month_start(previous, date) {
            starts.push(date);
        }
        previous = Some(date);
    }
    starts
}
