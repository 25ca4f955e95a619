//! Strategy parameters.

/// Parameters for selection, ranking, and drawdown control.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyConfig {
    /// Rolling window length in trading days (12 months).
    pub period: usize,
    /// Maximum number of names held; each gets `1 / fine_count` of capital.
    pub fine_count: usize,
    /// Drawdown from the running high that forces a liquidation.
    pub exit_thresh: f64,
    /// Recovery from the running low that lifts an exclusion.
    pub reenter_thresh: f64,
    pub min_market_cap: f64,
    pub max_market_cap: f64,
    pub leverage: f64,
    pub market: String,
    /// Fixed-income instrument that absorbs uninvested capital.
    pub bond_symbol: String,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        StrategyConfig {
            period: 12 * 21,
            fine_count: 100,
            exit_thresh: 0.10,
            reenter_thresh: 0.25,
            min_market_cap: 2e9,
            max_market_cap: 2e10,
            leverage: 10.0,
            market: "usa".to_string(),
            bond_symbol: "CME_TY1".to_string(),
        }
    }
}

impl StrategyConfig {
    pub fn in_cap_band(&self, market_cap: f64) -> bool {
        self.min_market_cap <= market_cap && market_cap <= self.max_market_cap
    }
}
