//! Daily universe feed row.

use chrono::NaiveDate;

/// One instrument's price and fundamentals snapshot for a trading day.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyRecord {
    pub symbol: String,
    pub date: NaiveDate,
    pub adjusted_price: f64,
    pub has_fundamental_data: bool,
    pub market: String,
    pub market_cap: Option<f64>,
}

impl DailyRecord {
    /// Market cap with missing values treated as zero.
    pub fn market_cap_or_zero(&self) -> f64 {
        self.market_cap.unwrap_or(0.0)
    }

    pub fn is_on_market(&self, market: &str) -> bool {
        self.market.eq_ignore_ascii_case(market)
    }
}

/// Dated price of a single instrument, used for the bond series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}
