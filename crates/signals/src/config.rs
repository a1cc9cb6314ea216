use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use common::{Error, Result};

/// Fixed thresholds used by the signal classifier.
///
/// Defaults are the production constants. A TOML file may override any
/// subset of fields; missing keys keep their default.
///
/// Example `config/signals.toml`:
/// ```toml
/// liquidity_floor = 250000.0
/// momentum_up_ratio = 1.5
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SignalThresholds {
    /// Minimum average daily value for a buy.
    pub liquidity_floor: f64,
    /// Average daily value below which a symbol is flagged illiquid.
    pub illiquidity_ceiling: f64,
    /// 5-day / 30-day value ratio at or above which momentum is positive.
    pub momentum_up_ratio: f64,
    /// Ratio at or below which momentum is negative.
    pub momentum_down_ratio: f64,
    /// Percent price change at or above which the trend supports a buy.
    pub price_up_pct: f64,
    /// Percent price change at or below which the trend signals a sell.
    pub price_down_pct: f64,
    /// Minimum fraction of period days the symbol must have traded.
    pub min_consistency: f64,
    /// Single-day share of total value that flags pump-like concentration.
    pub pump_share: f64,
}

impl Default for SignalThresholds {
    fn default() -> Self {
        Self {
            liquidity_floor: 100_000.0,
            illiquidity_ceiling: 10_000.0,
            momentum_up_ratio: 1.30,
            momentum_down_ratio: 0.70,
            price_up_pct: 5.0,
            price_down_pct: -5.0,
            min_consistency: 0.60,
            pump_share: 0.60,
        }
    }
}

impl SignalThresholds {
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("invalid signal thresholds: {e}")))
    }

    /// Load overrides from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("failed to read signal config at '{}': {e}", path.display()))
        })?;
        let thresholds = Self::from_toml(&content)?;
        info!(path = %path.display(), "Loaded signal thresholds");
        Ok(thresholds)
    }
}
