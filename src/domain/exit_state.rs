//! Drawdown exit and recovery reentry.
//!
//! Held names whose drawdown from the running high crosses the exit threshold
//! are liquidated and parked in the exited list. They leave that list only
//! during a fine pass, once their recovery condition holds, so a good rank
//! alone never brings a sunk name back.

use std::collections::HashMap;

use crate::domain::error::LowvolError;
use crate::domain::order::OrderReason;
use crate::domain::selection::SelectionState;
use crate::domain::tracker::{InstrumentTracker, Trackers};
use crate::ports::execution_port::ExecutionPort;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    HeldEligible,
    /// Held and crossing the exit threshold today; liquidated this tick.
    HeldExiting,
    Excluded,
}

/// Where a symbol sits in the exit/reentry cycle. `None` for a flat symbol
/// that is not excluded.
pub fn eligibility(
    symbol: &str,
    held: bool,
    state: &SelectionState,
    tracker: Option<&InstrumentTracker>,
) -> Result<Option<Eligibility>, LowvolError> {
    if held {
        let exiting = match tracker {
            Some(t) => t.exit_signal()?,
            None => false,
        };
        return Ok(Some(if exiting {
            Eligibility::HeldExiting
        } else {
            Eligibility::HeldEligible
        }));
    }
    if state.is_exited(symbol) {
        return Ok(Some(Eligibility::Excluded));
    }
    Ok(None)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExitCheck {
    /// Symbols liquidated for drawdown this tick, in holding order.
    pub exited: Vec<String>,
    /// Symbols forced out while already marked exited.
    pub inconsistencies: Vec<String>,
}

/// Liquidates held symbols with an exit signal and records them as exited.
///
/// Only symbols with a price today and a tracker are evaluated.
pub fn check_exits(
    held: &[String],
    prices: &HashMap<String, f64>,
    trackers: &Trackers,
    state: &mut SelectionState,
    sink: &mut dyn ExecutionPort,
) -> Result<ExitCheck, LowvolError> {
    let mut check = ExitCheck::default();

    for symbol in held {
        if !prices.contains_key(symbol) {
            continue;
        }
        let Some(tracker) = trackers.get(symbol) else {
            continue;
        };
        if !tracker.exit_signal()? {
            continue;
        }

        if state.is_exited(symbol) {
            tracing::error!(symbol = %symbol, "exit requested for a symbol already marked exited");
            check.inconsistencies.push(symbol.clone());
        }
        tracing::info!(
            symbol = %symbol,
            drawdown = tracker.drawdown()?,
            "drawdown exit"
        );
        sink.liquidate(symbol, OrderReason::DrawdownExit);
        check.exited.push(symbol.clone());
    }

    for symbol in &check.exited {
        if !state.is_exited(symbol) {
            state.exited.push(symbol.clone());
        }
    }
    state.candidates.retain(|s| !check.exited.contains(s));
    Ok(check)
}

/// Drops exited symbols that recovered or whose tracker is gone.
pub fn purge_recovered(state: &mut SelectionState, trackers: &Trackers) -> Result<(), LowvolError> {
    let mut still_exited = Vec::with_capacity(state.exited.len());
    for symbol in state.exited.drain(..) {
        match trackers.get(&symbol) {
            Some(tracker) if !tracker.reenter_signal()? => still_exited.push(symbol),
            Some(_) => tracing::info!(symbol = %symbol, "recovered, eligible again"),
            None => {}
        }
    }
    state.exited = still_exited;
    Ok(())
}
