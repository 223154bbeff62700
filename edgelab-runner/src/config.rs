//! Serializable runner configuration.

use edgelab_core::config::EngineConfig;
use edgelab_core::data::CandleInterval;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for a trading run: which symbols to cycle, how often, with
/// what balance, and the full engine parameter set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Symbols cycled each tick.
    pub symbols: Vec<String>,
    /// Candle interval requested from the provider.
    pub interval: CandleInterval,
    /// Candle history depth per fetch.
    pub candle_limit: usize,
    /// Seconds between cycles.
    pub cycle_secs: u64,
    /// Starting balance for the ledger.
    pub initial_balance: f64,
    /// Master seed for the synthetic provider and fixtures.
    pub master_seed: u64,
    /// Engine parameters (features, edge, signal, alloc, risk).
    pub engine: EngineConfig,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            symbols: vec!["BTCUSDT".to_string()],
            interval: CandleInterval::OneMinute,
            candle_limit: 200,
            cycle_secs: 5,
            initial_balance: 1_000.0,
            master_seed: 42,
            engine: EngineConfig::default(),
        }
    }
}

impl RunnerConfig {
    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).expect("RunnerConfig must serialize")
    }

    /// Load from a TOML file; missing fields fall back to defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("reading {}: {e}", path.display()))?;
        let config = toml::from_str(&text)
            .map_err(|e| anyhow::anyhow!("parsing {}: {e}", path.display()))?;
        Ok(config)
    }
}
