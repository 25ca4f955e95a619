#![allow(dead_code)]

use chrono::{Datelike, NaiveDate, Weekday};
use lowvol::domain::config::StrategyConfig;
use lowvol::domain::error::LowvolError;
pub use lowvol::domain::record::{DailyRecord, PricePoint};
use lowvol::ports::data_port::DataPort;
use std::collections::BTreeSet;

pub const BOND: &str = "CME_TY1";
pub const PERIOD: usize = 30;

pub struct MockDataPort {
    pub records: Vec<DailyRecord>,
    pub bond: Vec<PricePoint>,
    pub error: Option<String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            bond: Vec::new(),
            error: None,
        }
    }

    pub fn with_records(mut self, records: Vec<DailyRecord>) -> Self {
        self.records.extend(records);
        self
    }

    pub fn with_bond(mut self, bond: Vec<PricePoint>) -> Self {
        self.bond = bond;
        self
    }

    pub fn with_error(mut self, reason: &str) -> Self {
        self.error = Some(reason.to_string());
        self
    }

    fn check(&self) -> Result<(), LowvolError> {
        match &self.error {
            Some(reason) => Err(LowvolError::Data {
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl DataPort for MockDataPort {
    fn fetch_universe(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<DailyRecord>, LowvolError> {
        self.check()?;
        Ok(self
            .records
            .iter()
            .filter(|r| r.date >= start_date && r.date <= end_date)
            .cloned()
            .collect())
    }

    fn fetch_bond(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PricePoint>, LowvolError> {
        self.check()?;
        let points: Vec<PricePoint> = self
            .bond
            .iter()
            .filter(|p| p.date >= start_date && p.date <= end_date)
            .copied()
            .collect();
        if points.is_empty() {
            return Err(LowvolError::NoData {
                symbol: symbol.to_string(),
            });
        }
        Ok(points)
    }

    fn list_symbols(&self) -> Result<Vec<String>, LowvolError> {
        self.check()?;
        let symbols: BTreeSet<String> = self.records.iter().map(|r| r.symbol.clone()).collect();
        Ok(symbols.into_iter().collect())
    }

    fn get_data_range(&self) -> Result<Option<(NaiveDate, NaiveDate, usize)>, LowvolError> {
        self.check()?;
        let dates: BTreeSet<NaiveDate> = self.records.iter().map(|r| r.date).collect();
        Ok(match (dates.first(), dates.last()) {
            (Some(&first), Some(&last)) => Some((first, last, dates.len())),
            _ => None,
        })
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Monday to Friday dates between `from` and `to` inclusive.
pub fn weekdays(from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
    from.iter_days()
        .take_while(|d| *d <= to)
        .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        .collect()
}

pub fn make_record(symbol: &str, date: NaiveDate, price: f64, market_cap: Option<f64>) -> DailyRecord {
    DailyRecord {
        symbol: symbol.to_string(),
        date,
        adjusted_price: price,
        has_fundamental_data: true,
        market: "usa".to_string(),
        market_cap,
    }
}

/// One record per symbol per day, every symbol at the price `price_of`
/// returns for it on that day.
pub fn make_universe(
    symbols: &[&str],
    days: &[NaiveDate],
    market_cap: f64,
    price_of: impl Fn(&str, NaiveDate) -> f64,
) -> Vec<DailyRecord> {
    days.iter()
        .flat_map(|&day| {
            symbols
                .iter()
                .map(|s| make_record(s, day, price_of(s, day), Some(market_cap)))
                .collect::<Vec<_>>()
        })
        .collect()
}

pub fn make_bond(days: &[NaiveDate], price: f64) -> Vec<PricePoint> {
    days.iter().map(|&date| PricePoint { date, price }).collect()
}

pub fn eight_symbols() -> Vec<&'static str> {
    vec!["A", "B", "C", "D", "E", "F", "G", "H"]
}

pub fn sample_strategy(fine_count: usize) -> StrategyConfig {
    StrategyConfig {
        period: PERIOD,
        fine_count,
        ..StrategyConfig::default()
    }
}
