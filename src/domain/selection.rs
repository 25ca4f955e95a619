//! Run-wide selection state and the orchestration phase.

use std::fmt;

/// Gates when the fine filter and the rebalance may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    /// The next coarse pass runs the fine filter.
    Armed,
    /// The next data tick rebalances.
    Ready,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Idle => write!(f, "idle"),
            Phase::Armed => write!(f, "armed"),
            Phase::Ready => write!(f, "ready"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionState {
    /// Symbols chosen by the most recent fine pass, in rank order.
    pub candidates: Vec<String>,
    /// Symbols excluded after a drawdown exit, in exit order.
    pub exited: Vec<String>,
    pub phase: Phase,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_exited(&self, symbol: &str) -> bool {
        self.exited.iter().any(|s| s == symbol)
    }

    /// Month-start trigger.
    pub fn arm(&mut self) {
        if self.phase != Phase::Idle {
            tracing::warn!(phase = %self.phase, "arming selection before previous cycle completed");
        }
        self.phase = Phase::Armed;
    }

    /// Consumes an armed phase. Returns false when not armed.
    pub fn take_armed(&mut self) -> bool {
        if self.phase == Phase::Armed {
            self.phase = Phase::Ready;
            true
        } else {
            false
        }
    }

    /// Consumes a ready phase. Returns false when not ready.
    pub fn take_ready(&mut self) -> bool {
        if self.phase == Phase::Ready {
            self.phase = Phase::Idle;
            true
        } else {
            false
        }
    }
}
