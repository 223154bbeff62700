//! Engine configuration.
//!
//! Every heuristic constant in the pipeline — feature windows, z-score
//! scales, edge weights, gate thresholds, leverage range, oscillator
//! frequencies, breaker levels — is a config field with a documented default,
//! so deployments tune TOML files instead of recompiling.

use serde::{Deserialize, Serialize};

/// A z-score normalization pair: `z = (value - center) / scale`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZScale {
    pub center: f64,
    pub scale: f64,
}

impl ZScale {
    pub const fn new(center: f64, scale: f64) -> Self {
        Self { center, scale }
    }
}

/// A clip-normalize range: maps `[low, high]` onto `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormRange {
    pub low: f64,
    pub high: f64,
}

impl NormRange {
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Normalize `x` into [0, 1] within the range, clipping at both ends.
    /// Degenerate ranges (high <= low) normalize to 0.
    pub fn normalize(&self, x: f64) -> f64 {
        if self.high <= self.low {
            return 0.0;
        }
        ((x - self.low) / (self.high - self.low)).clamp(0.0, 1.0)
    }
}

/// Feature extractor windows and bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Minimum candles required to produce a snapshot.
    pub min_candles: usize,
    /// Signed-volume window for order-flow imbalance.
    pub ofi_window: usize,
    /// Trailing volume sum window used to normalize OFI.
    pub volume_norm_window: usize,
    /// Fast SMA period for the funding-rate proxy.
    pub funding_fast: usize,
    /// Slow SMA period for the funding-rate proxy.
    pub funding_slow: usize,
    /// Tail of the fast SMA series used for the curvature estimate.
    pub curvature_tail: usize,
    /// EMA smoothing factor for the open-interest proxy.
    pub oi_alpha: f64,
    /// SMA period for the basis calculation.
    pub basis_window: usize,
    /// Wick-density window for the liquidation proxy.
    pub liquidation_window: usize,
    /// Upper clip for the price-impact coefficient.
    pub impact_clip: f64,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            min_candles: 30,
            ofi_window: 5,
            volume_norm_window: 20,
            funding_fast: 8,
            funding_slow: 48,
            curvature_tail: 6,
            oi_alpha: 0.2,
            basis_window: 20,
            liquidation_window: 10,
            impact_clip: 10.0,
        }
    }
}

/// Edge synthesis weights. Positive weights push the edge in the feature's
/// direction; negative weights penalize stress, impact cost, and widening
/// spreads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeWeights {
    pub imbalance: f64,
    /// Relative sub-weights for the 1/5/20-bar imbalance windows.
    pub imbalance_windows: [f64; 3],
    pub ofi: f64,
    pub cvd: f64,
    pub oi_delta: f64,
    pub funding: f64,
    /// Curvature contribution relative to the funding weight.
    pub funding_curvature_sub: f64,
    pub basis: f64,
    pub mark_stress: f64,
    pub impact: f64,
    pub liquidation_density: f64,
    pub spread: f64,
    pub spread_velocity: f64,
}

impl Default for EdgeWeights {
    fn default() -> Self {
        Self {
            imbalance: 0.18,
            imbalance_windows: [1.0, 0.6, 0.4],
            ofi: 0.14,
            cvd: 0.12,
            oi_delta: 0.12,
            funding: 0.08,
            funding_curvature_sub: 0.5,
            basis: 0.08,
            mark_stress: -0.06,
            impact: -0.06,
            liquidation_density: -0.06,
            spread: -0.05,
            spread_velocity: -0.03,
        }
    }
}

/// Per-feature z-score normalization pairs. Centers and scales are heuristic,
/// chosen so a typical liquid perpetual produces z-scores of order one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeScales {
    pub imbalance_1: ZScale,
    pub imbalance_5: ZScale,
    pub imbalance_20: ZScale,
    pub ofi: ZScale,
    pub cvd: ZScale,
    pub oi_delta: ZScale,
    pub funding_rate: ZScale,
    pub funding_curvature: ZScale,
    pub basis: ZScale,
    pub mark_stress: ZScale,
    pub impact: ZScale,
    pub liquidation_density: ZScale,
    pub spread: ZScale,
    pub spread_velocity: ZScale,
}

impl Default for EdgeScales {
    fn default() -> Self {
        Self {
            imbalance_1: ZScale::new(0.0, 0.5),
            imbalance_5: ZScale::new(0.0, 0.4),
            imbalance_20: ZScale::new(0.0, 0.3),
            ofi: ZScale::new(0.0, 0.03),
            cvd: ZScale::new(0.0, 0.02),
            oi_delta: ZScale::new(0.0, 5.0),
            funding_rate: ZScale::new(0.0, 0.004),
            funding_curvature: ZScale::new(0.0, 0.0015),
            basis: ZScale::new(0.0, 0.01),
            mark_stress: ZScale::new(0.01, 0.02),
            impact: ZScale::new(0.4, 0.5),
            liquidation_density: ZScale::new(10.0, 7.0),
            spread: ZScale::new(0.5, 0.4),
            spread_velocity: ZScale::new(0.0, 0.3),
        }
    }
}

/// Edge synthesizer configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeConfig {
    pub weights: EdgeWeights,
    pub scales: EdgeScales,
}

/// Deployment-specific confidence boost (the 0.2-weight term).
///
/// `FlowAlignment` measures how strongly the four directional flow features
/// agree: the mean of their clipped normalized magnitudes. It rewards signals
/// where the flow is unanimous *and* pronounced, not merely same-signed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StrategyBoost {
    None,
    FlowAlignment,
}

impl Default for StrategyBoost {
    fn default() -> Self {
        StrategyBoost::FlowAlignment
    }
}

/// Confidence term weights. Must describe a convex combination.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceWeights {
    pub magnitude: f64,
    pub entropy_damp: f64,
    pub path: f64,
    pub boost: f64,
}

impl Default for ConfidenceWeights {
    fn default() -> Self {
        Self {
            magnitude: 0.4,
            entropy_damp: 0.25,
            path: 0.15,
            boost: 0.2,
        }
    }
}

/// Magnitude normalization ranges for the flow-alignment boost. Each
/// directional feature's absolute value maps onto [0, 1] within its range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoostNorms {
    pub imbalance: NormRange,
    pub ofi: NormRange,
    pub cvd: NormRange,
    pub oi_delta: NormRange,
}

impl Default for BoostNorms {
    fn default() -> Self {
        Self {
            imbalance: NormRange::new(0.0, 1.0),
            ofi: NormRange::new(0.0, 0.05),
            cvd: NormRange::new(0.0, 0.03),
            oi_delta: NormRange::new(0.0, 5.0),
        }
    }
}

/// Risk-penalty normalization ranges for the size factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PenaltyConfig {
    /// Total penalty cap before the size floor applies.
    pub cap: f64,
    pub mark_stress: NormRange,
    pub liquidation_density: NormRange,
    pub impact: NormRange,
}

impl Default for PenaltyConfig {
    fn default() -> Self {
        Self {
            cap: 0.85,
            mark_stress: NormRange::new(0.01, 0.05),
            liquidation_density: NormRange::new(3.0, 25.0),
            impact: NormRange::new(0.2, 2.0),
        }
    }
}

/// Signal generator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    /// Edge magnitudes below this produce no signal.
    pub min_edge: f64,
    /// Directional gates refuse entries when mark stress exceeds this.
    pub max_mark_stress: f64,
    /// Directional gates refuse entries when the impact coefficient exceeds this.
    pub max_impact: f64,
    /// Lower bound of the size factor.
    pub size_floor: f64,
    pub boost: StrategyBoost,
    pub boost_norms: BoostNorms,
    pub confidence_weights: ConfidenceWeights,
    pub penalty: PenaltyConfig,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            min_edge: 0.0025,
            max_mark_stress: 0.02,
            max_impact: 1.0,
            size_floor: 0.15,
            boost: StrategyBoost::default(),
            boost_norms: BoostNorms::default(),
            confidence_weights: ConfidenceWeights::default(),
            penalty: PenaltyConfig::default(),
        }
    }
}

/// Stop/take bracket parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BracketConfig {
    /// Base stop distance as a fraction of entry price.
    pub stop_base: f64,
    /// Base take-profit distance as a fraction of entry price.
    pub take_base: f64,
    pub stop_min: f64,
    pub stop_max: f64,
    pub take_min: f64,
    pub take_max: f64,
}

impl Default for BracketConfig {
    fn default() -> Self {
        Self {
            stop_base: 0.02,
            take_base: 0.06,
            stop_min: 0.003,
            stop_max: 0.08,
            take_min: 0.01,
            take_max: 0.20,
        }
    }
}

/// Capital allocator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocConfig {
    /// Unit bait stake multiplied by leverage and sizing factors.
    pub bait_stake: f64,
    pub min_leverage: f64,
    pub max_leverage: f64,
    /// Notional cap as a fraction of available balance.
    pub max_risk_per_trade: f64,
    /// Signals below this confidence are rejected.
    pub min_confidence: f64,
    /// Kelly payoff ratio (average win per unit average loss).
    pub payoff_ratio: f64,
    /// Oscillator frequencies of the bounded Kelly correction terms.
    pub osc_freq_a: f64,
    pub osc_freq_b: f64,
    pub bracket: BracketConfig,
}

impl Default for AllocConfig {
    fn default() -> Self {
        Self {
            bait_stake: 1.0,
            min_leverage: 3.0,
            max_leverage: 10.0,
            max_risk_per_trade: 0.02,
            min_confidence: 0.5,
            payoff_ratio: 1.5,
            osc_freq_a: 0.888,
            osc_freq_b: 8.977_020_214_210_413, // ln(7919)
            bracket: BracketConfig::default(),
        }
    }
}

/// Risk governor thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// Daily loss fraction that trips the emergency stop.
    pub emergency_stop_level: f64,
    /// Daily loss fraction that triggers a soft reset.
    pub daily_reset_threshold: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            emergency_stop_level: 0.10,
            daily_reset_threshold: 0.05,
        }
    }
}

/// Aggregate engine configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub features: FeatureConfig,
    pub edge: EdgeConfig,
    pub signal: SignalConfig,
    pub alloc: AllocConfig,
    pub risk: RiskConfig,
}

impl EngineConfig {
    /// Parse a TOML document. Missing sections and fields fall back to
    /// defaults, so a config file only states what it overrides.
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).expect("EngineConfig must serialize")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_constants() {
        let config = EngineConfig::default();
        assert_eq!(config.features.min_candles, 30);
        assert_eq!(config.edge.weights.imbalance, 0.18);
        assert_eq!(config.edge.scales.ofi.scale, 0.03);
        assert_eq!(config.signal.min_edge, 0.0025);
        assert_eq!(config.alloc.min_leverage, 3.0);
        assert_eq!(config.alloc.max_leverage, 10.0);
        assert_eq!(config.alloc.max_risk_per_trade, 0.02);
        assert_eq!(config.risk.emergency_stop_level, 0.10);
        assert_eq!(config.risk.daily_reset_threshold, 0.05);
    }

    #[test]
    fn toml_roundtrip_preserves_config() {
        let config = EngineConfig::default();
        let toml_str = config.to_toml_string();
        let parsed = EngineConfig::from_toml_str(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let parsed = EngineConfig::from_toml_str(
            r#"
            [signal]
            min_edge = 0.01

            [alloc]
            max_leverage = 20.0
            "#,
        )
        .unwrap();
        assert_eq!(parsed.signal.min_edge, 0.01);
        assert_eq!(parsed.alloc.max_leverage, 20.0);
        // untouched sections keep their defaults
        assert_eq!(parsed.features.min_candles, 30);
        assert_eq!(parsed.risk.emergency_stop_level, 0.10);
    }

    #[test]
    fn confidence_weights_sum_to_one() {
        let w = ConfidenceWeights::default();
        let sum = w.magnitude + w.entropy_damp + w.path + w.boost;
        assert!((sum - 1.0).abs() < 1e-12);
    }
}
