//! CSV file data adapter.
//!
//! The universe file carries one row per symbol per trading day:
//! `date,symbol,adjusted_price,has_fundamental_data,market,market_cap`
//! with an empty `market_cap` meaning no figure was reported. Rows come
//! back ordered by date, and rows sharing a date keep their file order.
//!
//! The bond file uses the Quantpedia futures layout: `;` separated,
//! `dd.mm.yyyy` dates, the back-adjusted price in the second column and
//! any line not starting with a digit ignored. Quantpedia dates mark the
//! close of the session, so each point is stamped one day later.

use crate::domain::error::LowvolError;
use crate::domain::record::{DailyRecord, PricePoint};
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

pub struct CsvAdapter {
    universe_path: PathBuf,
    bond_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(universe_path: PathBuf, bond_path: PathBuf) -> Self {
        Self {
            universe_path,
            bond_path,
        }
    }

    fn read_universe(&self) -> Result<Vec<DailyRecord>, LowvolError> {
        let content = read_file(&self.universe_path)?;
        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut rows = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| LowvolError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;

            let date = parse_iso_date(field(&record, 0, "date")?)?;
            let symbol = field(&record, 1, "symbol")?.trim().to_string();
            let adjusted_price: f64 =
                field(&record, 2, "adjusted_price")?
                    .trim()
                    .parse()
                    .map_err(|e| LowvolError::Data {
                        reason: format!("invalid adjusted_price for {}: {}", symbol, e),
                    })?;
            let has_fundamental_data = parse_flag(field(&record, 3, "has_fundamental_data")?)?;
            let market = field(&record, 4, "market")?.trim().to_string();
            let market_cap = match record.get(5).map(str::trim) {
                None | Some("") => None,
                Some(s) => Some(s.parse::<f64>().map_err(|e| LowvolError::Data {
                    reason: format!("invalid market_cap for {}: {}", symbol, e),
                })?),
            };

            rows.push(DailyRecord {
                symbol,
                date,
                adjusted_price,
                has_fundamental_data,
                market,
                market_cap,
            });
        }

        // stable: rows within a day stay in file order
        rows.sort_by_key(|r| r.date);
        Ok(rows)
    }
}

fn read_file(path: &Path) -> Result<String, LowvolError> {
    fs::read_to_string(path).map_err(|e| LowvolError::Data {
        reason: format!("failed to read {}: {}", path.display(), e),
    })
}

fn field<'r>(
    record: &'r csv::StringRecord,
    index: usize,
    name: &str,
) -> Result<&'r str, LowvolError> {
    record.get(index).ok_or_else(|| LowvolError::Data {
        reason: format!("missing {} column", name),
    })
}

fn parse_iso_date(s: &str) -> Result<NaiveDate, LowvolError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|e| LowvolError::Data {
        reason: format!("invalid date format: {}", e),
    })
}

fn parse_flag(s: &str) -> Result<bool, LowvolError> {
    match s.trim().to_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(LowvolError::Data {
            reason: format!("invalid has_fundamental_data value: {}", other),
        }),
    }
}

impl DataPort for CsvAdapter {
    fn fetch_universe(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<DailyRecord>, LowvolError> {
        let mut rows = self.read_universe()?;
        rows.retain(|r| r.date >= start_date && r.date <= end_date);
        Ok(rows)
    }

    fn fetch_bond(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PricePoint>, LowvolError> {
        let content = read_file(&self.bond_path)?;
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b';')
            .has_headers(false)
            .flexible(true)
            .from_reader(content.as_bytes());
        let mut points = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| LowvolError::Data {
                reason: format!("{} parse error: {}", symbol, e),
            })?;
            let Some(first) = record.get(0) else {
                continue;
            };
            if !first.starts_with(|c: char| c.is_ascii_digit()) {
                continue;
            }

            let stamped = NaiveDate::parse_from_str(first.trim(), "%d.%m.%Y").map_err(|e| {
                LowvolError::Data {
                    reason: format!("invalid {} date {}: {}", symbol, first, e),
                }
            })?;
            let date = stamped + chrono::Duration::days(1);
            if date < start_date || date > end_date {
                continue;
            }

            let price: f64 = field(&record, 1, "back_adjusted")?
                .trim()
                .parse()
                .map_err(|e| LowvolError::Data {
                    reason: format!("invalid {} price: {}", symbol, e),
                })?;
            points.push(PricePoint { date, price });
        }

        if points.is_empty() {
            return Err(LowvolError::NoData {
                symbol: symbol.to_string(),
            });
        }
        points.sort_by_key(|p| p.date);
        Ok(points)
    }

    fn list_symbols(&self) -> Result<Vec<String>, LowvolError> {
        let symbols: BTreeSet<String> = self
            .read_universe()?
            .into_iter()
            .map(|r| r.symbol)
            .collect();
        Ok(symbols.into_iter().collect())
    }

    /// First date, last date and number of distinct trading days.
    fn get_data_range(&self) -> Result<Option<(NaiveDate, NaiveDate, usize)>, LowvolError> {
        let dates: BTreeSet<NaiveDate> = self.read_universe()?.into_iter().map(|r| r.date).collect();
        match (dates.first(), dates.last()) {
            (Some(&first), Some(&last)) => Ok(Some((first, last, dates.len()))),
            _ => Ok(None),
        }
    }
}
