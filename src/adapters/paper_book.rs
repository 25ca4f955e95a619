//! In-memory execution sink.
//!
//! Holds target weights as a fraction of equity and logs every order it
//! accepts. Liquidating a symbol that is not held is a no-op.

use crate::domain::order::{OrderAction, OrderReason, OrderRecord};
use crate::ports::execution_port::ExecutionPort;
use chrono::NaiveDate;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct PaperBook {
    leverage: f64,
    current_date: Option<NaiveDate>,
    weights: BTreeMap<String, f64>,
    leverage_by_symbol: BTreeMap<String, f64>,
    orders: Vec<OrderRecord>,
}

impl PaperBook {
    pub fn new(leverage: f64) -> Self {
        Self {
            leverage,
            current_date: None,
            weights: BTreeMap::new(),
            leverage_by_symbol: BTreeMap::new(),
            orders: Vec::new(),
        }
    }

    pub fn orders(&self) -> &[OrderRecord] {
        &self.orders
    }

    pub fn weights(&self) -> &BTreeMap<String, f64> {
        &self.weights
    }

    pub fn weight(&self, symbol: &str) -> f64 {
        self.weights.get(symbol).copied().unwrap_or(0.0)
    }

    /// Sum of absolute target weights.
    pub fn gross_exposure(&self) -> f64 {
        self.weights.values().map(|w| w.abs()).sum()
    }

    /// Leverage granted to a symbol when it was first targeted.
    pub fn leverage_for(&self, symbol: &str) -> Option<f64> {
        self.leverage_by_symbol.get(symbol).copied()
    }

    fn record(&mut self, symbol: &str, action: OrderAction, reason: OrderReason) {
        let Some(date) = self.current_date else {
            tracing::warn!(symbol, %reason, "order outside a trading day dropped");
            return;
        };
        self.orders.push(OrderRecord {
            date,
            symbol: symbol.to_string(),
            action,
            reason,
        });
    }
}

impl ExecutionPort for PaperBook {
    fn begin_day(&mut self, date: NaiveDate) {
        self.current_date = Some(date);
    }

    fn liquidate(&mut self, symbol: &str, reason: OrderReason) {
        if self.weights.remove(symbol).is_none() {
            tracing::debug!(symbol, %reason, "liquidate skipped, not held");
            return;
        }
        tracing::debug!(symbol, %reason, "liquidate");
        self.record(symbol, OrderAction::Liquidate, reason);
    }

    fn set_target_weight(&mut self, symbol: &str, weight: f64, reason: OrderReason) {
        if weight == 0.0 {
            self.liquidate(symbol, reason);
            return;
        }
        self.leverage_by_symbol
            .entry(symbol.to_string())
            .or_insert(self.leverage);
        self.weights.insert(symbol.to_string(), weight);
        self.record(symbol, OrderAction::TargetWeight(weight), reason);

        let gross = self.gross_exposure();
        if gross > self.leverage {
            tracing::warn!(gross, leverage = self.leverage, "gross exposure above leverage");
        }
    }

    fn is_invested(&self, symbol: &str) -> bool {
        self.weights.contains_key(symbol)
    }

    fn invested(&self) -> Vec<String> {
        self.weights.keys().cloned().collect()
    }
}
