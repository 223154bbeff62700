//! MicrostructureSnapshot — per-symbol, per-cycle feature record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw microstructure proxies derived from a candle series.
///
/// All fields are finite by construction: every division in the extractor is
/// epsilon-guarded and the unbounded proxies are clipped to documented ranges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Range-position imbalance over the last bar, in [-1, 1].
    pub imbalance_1: f64,
    /// Range-position imbalance over the last 5 bars, in [-1, 1].
    pub imbalance_5: f64,
    /// Range-position imbalance over the last 20 bars, in [-1, 1].
    pub imbalance_20: f64,
    /// Order-flow imbalance: signed volume over a short window, volume-normalized.
    pub ofi: f64,
    /// Cumulative volume delta over the full series, volume-normalized.
    pub cvd: f64,
    /// Funding-rate proxy, clipped to [-0.02, 0.02].
    pub funding_rate: f64,
    /// Second difference of the fast SMA, clipped to [-0.005, 0.005].
    pub funding_curvature: f64,
    /// Open-interest proxy: EMA of volume.
    pub open_interest: f64,
    /// Last increment of the open-interest proxy.
    pub oi_delta: f64,
    /// (last close - 20-bar SMA) / last close.
    pub basis: f64,
    /// |last range| / last close.
    pub mark_stress: f64,
    /// Mean wick fraction over the last 10 bars.
    pub liquidation_density: f64,
    /// Last bar's high-low range, in price units.
    pub spread: f64,
    /// Relative change of the range versus the previous bar.
    pub spread_velocity: f64,
    /// Price-impact coefficient (Kyle's-lambda proxy), clipped to [0, 10].
    pub impact_coefficient: f64,
    /// Action statistic over the last 3-point price/volatility path.
    pub action_integral: f64,
}

impl FeatureVector {
    /// The feature values that enter entropy bucketing, in a fixed order.
    ///
    /// The open-interest level and the action integral are excluded: the
    /// former is an absolute volume scale, the latter is consumed only by
    /// the signal confidence path term.
    pub fn entropy_inputs(&self) -> [f64; 14] {
        [
            self.imbalance_1,
            self.imbalance_5,
            self.imbalance_20,
            self.ofi,
            self.cvd,
            self.oi_delta,
            self.funding_rate,
            self.funding_curvature,
            self.basis,
            self.mark_stress,
            self.impact_coefficient,
            self.liquidation_density,
            self.spread,
            self.spread_velocity,
        ]
    }

    /// True if every field is finite.
    pub fn is_finite(&self) -> bool {
        self.entropy_inputs().iter().all(|v| v.is_finite())
            && self.open_interest.is_finite()
            && self.action_integral.is_finite()
    }
}

/// Immutable per-cycle record: raw features plus the synthesized edge score
/// and entropy. Created fresh each cycle, never mutated, consumed immediately
/// by the signal generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MicrostructureSnapshot {
    pub symbol: String,
    pub ts: DateTime<Utc>,
    pub features: FeatureVector,
    /// Weighted feature combination, in [-1.5, 1.5].
    pub edge_score: f64,
    /// Normalized feature disagreement, in [0, 1].
    pub entropy: f64,
}
