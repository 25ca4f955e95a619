//! Backtest day loop.
//!
//! BacktestConfig defines the simulated window. Each trading day runs the
//! universe selection, fires the month-start trigger on the first trading day
//! of a month, then delivers the data tick.

use chrono::NaiveDate;

use crate::domain::calendar::is_month_start;
use crate::domain::config::StrategyConfig;
use crate::domain::engine::Engine;
use crate::domain::error::LowvolError;
use crate::domain::feed::FeedStore;
use crate::ports::execution_port::ExecutionPort;

#[derive(Debug, Clone)]
pub struct BacktestConfig {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl BacktestConfig {
    /// First date worth loading so trackers created on day one can warm up.
    /// Trading days run at roughly 5 per 7 calendar days; twice the period
    /// in calendar days leaves room for holidays.
    pub fn warmup_start(&self, period: usize) -> NaiveDate {
        self.start_date - chrono::Duration::days(2 * period as i64)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SymbolEvent {
    pub date: NaiveDate,
    pub symbol: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rebalance {
    pub date: NaiveDate,
    pub targeted: Vec<String>,
    pub entries: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BacktestResult {
    pub trading_days: usize,
    pub rebalances: Vec<Rebalance>,
    pub exits: Vec<SymbolEvent>,
    pub inconsistencies: Vec<SymbolEvent>,
    /// Symbols still excluded when the run ends.
    pub excluded: Vec<String>,
    pub trackers: usize,
}

pub fn run_backtest(
    feed: &FeedStore,
    strategy: &StrategyConfig,
    config: &BacktestConfig,
    sink: &mut dyn ExecutionPort,
) -> Result<BacktestResult, LowvolError> {
    let mut engine = Engine::new(strategy.clone());
    let mut result = BacktestResult::default();
    let mut previous: Option<NaiveDate> = None;

    for date in feed.timeline() {
        if date > config.end_date {
            break;
        }
        if date < config.start_date {
            previous = Some(date);
            continue;
        }
        let month_start = is_month_start(previous, date);
        previous = Some(date);

        sink.begin_day(date);
        engine.on_universe(date, feed.records_on(date), feed)?;
        if month_start {
            tracing::debug!(%date, "month start");
            engine.on_month_start();
        }

        let prices = feed.prices_on(date, &strategy.bond_symbol);
        let tick = engine.on_data(date, &prices, sink)?;

        result.trading_days += 1;
        for symbol in tick.exits {
            result.exits.push(SymbolEvent { date, symbol });
        }
        for symbol in tick.inconsistencies {
            result.inconsistencies.push(SymbolEvent { date, symbol });
        }
        if tick.rebalanced {
            result.rebalances.push(Rebalance {
                date,
                targeted: tick.targeted,
                entries: tick.entries,
            });
        }
    }

    result.excluded = engine.exited().to_vec();
    result.trackers = engine.tracker_count();

    tracing::info!(
        days = result.trading_days,
        rebalances = result.rebalances.len(),
        exits = result.exits.len(),
        "backtest finished"
    );
    Ok(result)
}
