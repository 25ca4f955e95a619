//! Order intents emitted toward the execution sink.

use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderReason {
    /// Drawdown from the running high crossed the exit threshold.
    DrawdownExit,
    /// Held name no longer among the candidates at a rebalance.
    RebalanceOut,
    /// Bond sized to the uninvested fraction.
    BondAllocation,
    /// Equal-weight allocation to a candidate.
    Rebalance,
}

impl fmt::Display for OrderReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderReason::DrawdownExit => "drawdown_exit",
            OrderReason::RebalanceOut => "rebalance_out",
            OrderReason::BondAllocation => "bond_allocation",
            OrderReason::Rebalance => "rebalance",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OrderAction {
    Liquidate,
    TargetWeight(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    pub date: NaiveDate,
    pub symbol: String,
    pub action: OrderAction,
    pub reason: OrderReason,
}

impl OrderRecord {
    /// Target weight after the order; zero for liquidations.
    pub fn weight(&self) -> f64 {
        match self.action {
            OrderAction::Liquidate => 0.0,
            OrderAction::TargetWeight(w) => w,
        }
    }
}
