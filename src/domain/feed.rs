//! In-memory universe feed and its trading timeline.
//!
//! Trading days come from the universe alone. The bond is quoted on its own
//! calendar and is read as of each trading day, so a bond stamp that lands
//! on a weekend never creates a session.

use crate::domain::error::LowvolError;
use crate::domain::record::{DailyRecord, PricePoint};
use crate::ports::data_port::HistoryPort;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Default)]
pub struct FeedStore {
    by_date: BTreeMap<NaiveDate, Vec<DailyRecord>>,
    closes: HashMap<String, Vec<(NaiveDate, f64)>>,
    bond: BTreeMap<NaiveDate, f64>,
}

impl FeedStore {
    pub fn new(records: Vec<DailyRecord>, bond: Vec<PricePoint>) -> Self {
        let mut by_date: BTreeMap<NaiveDate, Vec<DailyRecord>> = BTreeMap::new();
        let mut closes: HashMap<String, Vec<(NaiveDate, f64)>> = HashMap::new();

        for rec in records {
            closes
                .entry(rec.symbol.clone())
                .or_default()
                .push((rec.date, rec.adjusted_price));
            by_date.entry(rec.date).or_default().push(rec);
        }
        for series in closes.values_mut() {
            series.sort_by_key(|(d, _)| *d);
        }

        let bond = bond.into_iter().map(|p| (p.date, p.price)).collect();
        Self {
            by_date,
            closes,
            bond,
        }
    }

    pub fn records_on(&self, date: NaiveDate) -> &[DailyRecord] {
        self.by_date.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Latest bond price on or before `date`.
    pub fn bond_price(&self, date: NaiveDate) -> Option<f64> {
        self.bond.range(..=date).next_back().map(|(_, p)| *p)
    }

    pub fn symbol_count(&self) -> usize {
        self.closes.len()
    }

    /// Every date with at least one universe record, ascending.
    pub fn timeline(&self) -> Vec<NaiveDate> {
        self.by_date.keys().copied().collect()
    }

    /// Prices available on a date: universe records plus the last known bond
    /// price.
    pub fn prices_on(&self, date: NaiveDate, bond_symbol: &str) -> HashMap<String, f64> {
        let mut prices: HashMap<String, f64> = self
            .records_on(date)
            .iter()
            .map(|r| (r.symbol.clone(), r.adjusted_price))
            .collect();
        if let Some(p) = self.bond_price(date) {
            prices.insert(bond_symbol.to_string(), p);
        }
        prices
    }
}

impl HistoryPort for FeedStore {
    fn history(
        &self,
        symbol: &str,
        as_of: NaiveDate,
        count: usize,
    ) -> Result<Vec<f64>, LowvolError> {
        let Some(series) = self.closes.get(symbol) else {
            return Ok(Vec::new());
        };
        let end = series.partition_point(|(d, _)| *d <= as_of);
        let start = end.saturating_sub(count);
        Ok(series[start..end].iter().map(|(_, p)| *p).collect())
    }
}
