//! Two-stage universe filter.
//!
//! The coarse stage runs every trading day: it feeds prices into the known
//! trackers and, on an armed pass, creates trackers for newly listed names and
//! emits everything with enough history. The fine stage then narrows that set
//! to mid caps with high momentum and low volatility, minus names still
//! excluded after a drawdown exit.

use crate::domain::config::StrategyConfig;
use crate::domain::error::LowvolError;
use crate::domain::exit_state::purge_recovered;
use crate::domain::record::DailyRecord;
use crate::domain::selection::SelectionState;
use crate::domain::tracker::{InstrumentTracker, Trackers};
use crate::ports::data_port::HistoryPort;
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub enum CoarseOutcome {
    /// Not armed; the selection stays as it is.
    Unchanged,
    /// Records of ready instruments passed on to the fine stage.
    Selected(Vec<DailyRecord>),
}

#[derive(Debug, Clone)]
pub struct UniverseFilter {
    config: StrategyConfig,
    trackers: Trackers,
}

impl UniverseFilter {
    pub fn new(config: StrategyConfig) -> Self {
        Self {
            config,
            trackers: Trackers::new(),
        }
    }

    pub fn trackers(&self) -> &Trackers {
        &self.trackers
    }

    pub fn tracker(&self, symbol: &str) -> Option<&InstrumentTracker> {
        self.trackers.get(symbol)
    }

    pub fn tracker_mut(&mut self, symbol: &str) -> Option<&mut InstrumentTracker> {
        self.trackers.get_mut(symbol)
    }

    pub fn tracker_count(&self) -> usize {
        self.trackers.len()
    }

    /// Coarse stage for one trading day.
    pub fn coarse(
        &mut self,
        date: NaiveDate,
        records: &[DailyRecord],
        state: &mut SelectionState,
        history: &dyn HistoryPort,
    ) -> CoarseOutcome {
        for rec in records {
            if let Some(tracker) = self.trackers.get_mut(&rec.symbol) {
                tracker.update(rec.adjusted_price);
            }
        }

        if !state.take_armed() {
            return CoarseOutcome::Unchanged;
        }

        let selected: Vec<&DailyRecord> = records
            .iter()
            .filter(|r| r.has_fundamental_data && r.is_on_market(&self.config.market))
            .collect();

        for rec in &selected {
            if self.trackers.contains_key(&rec.symbol) {
                continue;
            }
            let tracker = self.warm_up(&rec.symbol, date, history);
            self.trackers.insert(rec.symbol.clone(), tracker);
        }

        let ready: Vec<DailyRecord> = selected
            .into_iter()
            .filter(|r| self.trackers.get(&r.symbol).is_some_and(|t| t.is_ready()))
            .cloned()
            .collect();

        tracing::info!(
            %date,
            ready = ready.len(),
            trackers = self.trackers.len(),
            "coarse selection"
        );
        CoarseOutcome::Selected(ready)
    }

    fn warm_up(
        &self,
        symbol: &str,
        date: NaiveDate,
        history: &dyn HistoryPort,
    ) -> InstrumentTracker {
        let mut tracker = InstrumentTracker::new(
            self.config.period,
            self.config.exit_thresh,
            self.config.reenter_thresh,
        );
        let closes = match history.history(symbol, date, self.config.period) {
            Ok(closes) => closes,
            Err(e) => {
                tracing::warn!(symbol, error = %e, "history request failed");
                Vec::new()
            }
        };
        if closes.is_empty() {
            tracing::info!(symbol, "not enough data yet");
        }
        for close in closes {
            tracker.update(close);
        }
        tracker
    }

    /// Fine stage: cap band, momentum half, volatility quartile, exclusions.
    pub fn fine(
        &self,
        coarse: Vec<DailyRecord>,
        state: &mut SelectionState,
    ) -> Result<Vec<String>, LowvolError> {
        let in_band: Vec<DailyRecord> = coarse
            .into_iter()
            .filter(|r| r.market_cap_or_zero() != 0.0)
            .filter(|r| self.config.in_cap_band(r.market_cap_or_zero()))
            .collect();

        let mut by_momentum = Vec::with_capacity(in_band.len());
        for rec in in_band {
            let momentum = self.ready_tracker(&rec.symbol)?.momentum()?;
            by_momentum.push((rec.symbol, momentum));
        }
        by_momentum.sort_by(|a, b| a.1.total_cmp(&b.1));
        let upper_half = by_momentum.split_off(by_momentum.len() / 2);

        let mut by_volatility = Vec::with_capacity(upper_half.len());
        for (symbol, _) in upper_half {
            let volatility = self.ready_tracker(&symbol)?.volatility()?;
            by_volatility.push((symbol, volatility));
        }
        by_volatility.sort_by(|a, b| a.1.total_cmp(&b.1));
        let quartile = (by_volatility.len() / 4).min(self.config.fine_count);
        by_volatility.truncate(quartile);

        purge_recovered(state, &self.trackers)?;

        let candidates: Vec<String> = by_volatility
            .into_iter()
            .map(|(symbol, _)| symbol)
            .filter(|s| !state.is_exited(s))
            .collect();

        tracing::info!(
            candidates = candidates.len(),
            excluded = state.exited.len(),
            "fine selection"
        );
        state.candidates = candidates.clone();
        Ok(candidates)
    }

    fn ready_tracker(&self, symbol: &str) -> Result<&InstrumentTracker, LowvolError> {
        self.trackers
            .get(symbol)
            .ok_or_else(|| LowvolError::InvalidState {
                reason: format!("no tracker for {}", symbol),
            })
    }

    #[cfg(test)]
    pub(crate) fn insert_tracker(&mut self, symbol: &str, tracker: InstrumentTracker) {
        self.trackers.insert(symbol.to_string(), tracker);
    }
}
