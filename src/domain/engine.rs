//! Selection and rebalance orchestration.
//!
//! The month-start trigger arms the engine. The next coarse pass runs the fine
//! filter and marks it ready, and the data tick after that rebalances. Drawdown
//! exits are checked on every tick before any rebalancing.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::domain::config::StrategyConfig;
use crate::domain::error::LowvolError;
use crate::domain::exit_state::{self, Eligibility};
use crate::domain::order::OrderReason;
use crate::domain::record::DailyRecord;
use crate::domain::selection::{Phase, SelectionState};
use crate::domain::tracker::InstrumentTracker;
use crate::domain::universe::{CoarseOutcome, UniverseFilter};
use crate::ports::data_port::HistoryPort;
use crate::ports::execution_port::ExecutionPort;

/// What one data tick did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub exits: Vec<String>,
    pub inconsistencies: Vec<String>,
    pub rebalanced: bool,
    /// Candidates targeted at this rebalance, in rank order.
    pub targeted: Vec<String>,
    /// Candidates newly entered at this rebalance.
    pub entries: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Engine {
    config: StrategyConfig,
    universe: UniverseFilter,
    state: SelectionState,
}

impl Engine {
    pub fn new(config: StrategyConfig) -> Self {
        let universe = UniverseFilter::new(config.clone());
        Self {
            config,
            universe,
            state: SelectionState::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn candidates(&self) -> &[String] {
        &self.state.candidates
    }

    pub fn exited(&self) -> &[String] {
        &self.state.exited
    }

    pub fn tracker(&self, symbol: &str) -> Option<&InstrumentTracker> {
        self.universe.tracker(symbol)
    }

    pub fn tracker_count(&self) -> usize {
        self.universe.tracker_count()
    }

    pub fn eligibility(
        &self,
        symbol: &str,
        sink: &dyn ExecutionPort,
    ) -> Result<Option<Eligibility>, LowvolError> {
        exit_state::eligibility(
            symbol,
            sink.is_invested(symbol),
            &self.state,
            self.universe.tracker(symbol),
        )
    }

    /// Month-start trigger.
    pub fn on_month_start(&mut self) {
        self.state.arm();
    }

    /// Universe selection for one day. Returns the new candidates when the
    /// fine filter ran.
    pub fn on_universe(
        &mut self,
        date: NaiveDate,
        records: &[DailyRecord],
        history: &dyn HistoryPort,
    ) -> Result<Option<Vec<String>>, LowvolError> {
        match self
            .universe
            .coarse(date, records, &mut self.state, history)
        {
            CoarseOutcome::Unchanged => Ok(None),
            CoarseOutcome::Selected(selected) => {
                let candidates = self.universe.fine(selected, &mut self.state)?;
                Ok(Some(candidates))
            }
        }
    }

    /// Daily data tick: drawdown exits, then the rebalance when ready.
    ///
    /// `prices` holds every symbol with data today, bond included.
    pub fn on_data(
        &mut self,
        date: NaiveDate,
        prices: &HashMap<String, f64>,
        sink: &mut dyn ExecutionPort,
    ) -> Result<TickReport, LowvolError> {
        let held = sink.invested();
        let check = exit_state::check_exits(
            &held,
            prices,
            self.universe.trackers(),
            &mut self.state,
            sink,
        )?;

        let mut report = TickReport {
            exits: check.exited,
            inconsistencies: check.inconsistencies,
            ..TickReport::default()
        };

        if !self.state.take_ready() {
            return Ok(report);
        }

        let held: Vec<String> = held
            .into_iter()
            .filter(|s| !report.exits.contains(s))
            .collect();
        let bond = self.config.bond_symbol.clone();
        let candidates = std::mem::take(&mut self.state.candidates);

        for symbol in &held {
            if *symbol != bond && !candidates.contains(symbol) {
                sink.liquidate(symbol, OrderReason::RebalanceOut);
            }
        }

        let fine_count = self.config.fine_count as f64;
        if candidates.len() == self.config.fine_count {
            sink.liquidate(&bond, OrderReason::BondAllocation);
        } else {
            let bond_weight = 1.0 - candidates.len() as f64 / fine_count;
            sink.set_target_weight(&bond, bond_weight, OrderReason::BondAllocation);
        }

        for symbol in &candidates {
            if !prices.contains_key(symbol) {
                continue;
            }
            let was_held = held.contains(symbol);
            sink.set_target_weight(symbol, 1.0 / fine_count, OrderReason::Rebalance);
            report.targeted.push(symbol.clone());
            if !was_held {
                if let Some(tracker) = self.universe.tracker_mut(symbol) {
                    tracker.reset_high();
                }
                report.entries.push(symbol.clone());
            }
        }

        tracing::info!(
            %date,
            targeted = report.targeted.len(),
            entries = report.entries.len(),
            "rebalanced"
        );
        report.rebalanced = true;
        Ok(report)
    }
}
