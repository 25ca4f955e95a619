//! Rolling per-instrument statistics.
//!
//! Keeps the last `period` prices (index 0 is the most recent) together with a
//! running high and low. The low restarts whenever a new high prints, so the
//! high/low pair always describes the drawdown since the latest peak.

use std::collections::{HashMap, VecDeque};

use crate::domain::error::LowvolError;

/// Number of observations per volatility block (one trading week).
pub const WEEK_LENGTH: usize = 5;

/// Index of the price one month back, used as the momentum end point.
pub const MOMENTUM_SKIP: usize = 21;

/// Trackers keyed by symbol. Entries live for the whole run once created.
pub type Trackers = HashMap<String, InstrumentTracker>;

#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentTracker {
    period: usize,
    exit_thresh: f64,
    reenter_thresh: f64,
    window: VecDeque<f64>,
    high: f64,
    low: f64,
}

impl InstrumentTracker {
    pub fn new(period: usize, exit_thresh: f64, reenter_thresh: f64) -> Self {
        Self {
            period,
            exit_thresh,
            reenter_thresh,
            window: VecDeque::with_capacity(period),
            high: 0.0,
            low: 0.0,
        }
    }

    pub fn update(&mut self, price: f64) {
        if self.window.len() == self.period {
            self.window.pop_back();
        }
        self.window.push_front(price);

        if price > self.high {
            self.low = price;
        } else {
            self.low = self.low.min(price);
        }
        self.high = self.high.max(price);
    }

    pub fn is_ready(&self) -> bool {
        self.window.len() >= self.period
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    /// Most recent price, if any.
    pub fn latest(&self) -> Option<f64> {
        self.window.front().copied()
    }

    /// Population standard deviation of weekly block returns.
    ///
    /// The window is cut into consecutive blocks of [`WEEK_LENGTH`] starting
    /// at the most recent price. Each block contributes `(first - last) / last`.
    /// When the period is not a multiple of the block length the trailing
    /// block is shorter and is still included.
    pub fn volatility(&self) -> Result<f64, LowvolError> {
        self.ensure_ready("volatility")?;

        let prices: Vec<f64> = self.window.iter().copied().collect();
        let returns: Vec<f64> = prices
            .chunks(WEEK_LENGTH)
            .map(|week| {
                let first = week[0];
                let last = week[week.len() - 1];
                (first - last) / last
            })
            .collect();

        let n = returns.len() as f64;
        let mean = returns.iter().sum::<f64>() / n;
        let variance = returns
            .iter()
            .map(|r| {
                let diff = r - mean;
                diff * diff
            })
            .sum::<f64>()
            / n;

        Ok(variance.sqrt())
    }

    /// 12 month minus 1 month momentum: `price[21] / price[period - 1] - 1`.
    pub fn momentum(&self) -> Result<f64, LowvolError> {
        self.ensure_ready("momentum")?;
        if self.period <= MOMENTUM_SKIP {
            return Err(LowvolError::InvalidState {
                reason: format!(
                    "momentum needs a period above {}, got {}",
                    MOMENTUM_SKIP, self.period
                ),
            });
        }
        Ok(self.window[MOMENTUM_SKIP] / self.window[self.period - 1] - 1.0)
    }

    /// Fractional decline of the latest price from the running high.
    pub fn drawdown(&self) -> Result<f64, LowvolError> {
        let latest = self.require_latest("drawdown")?;
        if self.high <= 0.0 {
            return Err(LowvolError::InvalidState {
                reason: format!("drawdown undefined with running high {}", self.high),
            });
        }
        Ok(1.0 - latest / self.high)
    }

    /// Restart drawdown tracking from the latest price. No-op on an empty window.
    pub fn reset_high(&mut self) {
        if let Some(latest) = self.latest() {
            self.high = latest;
            self.low = latest;
        }
    }

    pub fn exit_signal(&self) -> Result<bool, LowvolError> {
        Ok(self.drawdown()? > self.exit_thresh)
    }

    /// True once the price has recovered far enough off the low, or sits on
    /// the running high.
    pub fn reenter_signal(&self) -> Result<bool, LowvolError> {
        let latest = self.require_latest("reenter signal")?;
        if latest == self.high {
            return Ok(true);
        }
        if self.low <= 0.0 {
            return Err(LowvolError::InvalidState {
                reason: format!("recovery undefined with running low {}", self.low),
            });
        }
        Ok(latest / self.low - 1.0 > self.reenter_thresh)
    }

    fn ensure_ready(&self, what: &str) -> Result<(), LowvolError> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(LowvolError::InvalidState {
                reason: format!(
                    "{} requested with {} of {} prices",
                    what,
                    self.window.len(),
                    self.period
                ),
            })
        }
    }

    fn require_latest(&self, what: &str) -> Result<f64, LowvolError> {
        self.latest().ok_or_else(|| LowvolError::InvalidState {
            reason: format!("{} requested on an empty window", what),
        })
    }
}
