//! Edge synthesis: z-score normalization and weighted combination.

pub mod entropy;

pub use entropy::feature_entropy;

use crate::config::{EdgeConfig, ZScale};
use crate::domain::{FeatureVector, MicrostructureSnapshot};
use crate::features::math::clip;
use chrono::{DateTime, Utc};

/// Lower/upper clip of the synthesized edge score.
pub const EDGE_MIN: f64 = -1.5;
pub const EDGE_MAX: f64 = 1.5;

/// Normalizes features against configured (center, scale) pairs and combines
/// them into a bounded edge score plus an entropy measure.
#[derive(Debug, Clone, Default)]
pub struct EdgeSynthesizer {
    config: EdgeConfig,
}

fn z(value: f64, scale: ZScale) -> f64 {
    if scale.scale <= 0.0 {
        return 0.0;
    }
    (value - scale.center) / scale.scale
}

impl EdgeSynthesizer {
    pub fn new(config: EdgeConfig) -> Self {
        Self { config }
    }

    /// Weighted z-score combination, clipped to [-1.5, 1.5].
    pub fn edge_score(&self, f: &FeatureVector) -> f64 {
        let w = &self.config.weights;
        let s = &self.config.scales;

        let imbalance = w.imbalance_windows[0] * z(f.imbalance_1, s.imbalance_1)
            + w.imbalance_windows[1] * z(f.imbalance_5, s.imbalance_5)
            + w.imbalance_windows[2] * z(f.imbalance_20, s.imbalance_20);
        let funding = z(f.funding_rate, s.funding_rate)
            + w.funding_curvature_sub * z(f.funding_curvature, s.funding_curvature);

        let score = w.imbalance * imbalance
            + w.ofi * z(f.ofi, s.ofi)
            + w.cvd * z(f.cvd, s.cvd)
            + w.oi_delta * z(f.oi_delta, s.oi_delta)
            + w.funding * funding
            + w.basis * z(f.basis, s.basis)
            + w.mark_stress * z(f.mark_stress, s.mark_stress)
            + w.impact * z(f.impact_coefficient, s.impact)
            + w.liquidation_density * z(f.liquidation_density, s.liquidation_density)
            + w.spread * z(f.spread, s.spread)
            + w.spread_velocity * z(f.spread_velocity, s.spread_velocity);

        clip(score, EDGE_MIN, EDGE_MAX)
    }

    /// Entropy over the snapshot's entropy-eligible features.
    pub fn entropy(&self, f: &FeatureVector) -> f64 {
        feature_entropy(&f.entropy_inputs())
    }

    /// Build the immutable per-cycle snapshot from a feature vector.
    pub fn synthesize(
        &self,
        symbol: &str,
        ts: DateTime<Utc>,
        features: FeatureVector,
    ) -> MicrostructureSnapshot {
        let edge_score = self.edge_score(&features);
        let entropy = self.entropy(&features);
        MicrostructureSnapshot {
            symbol: symbol.to_string(),
            ts,
            features,
            edge_score,
            entropy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EdgeConfig;

    fn flat_features() -> FeatureVector {
        FeatureVector {
            imbalance_1: 0.0,
            imbalance_5: 0.0,
            imbalance_20: 0.0,
            ofi: 0.0,
            cvd: 0.0,
            funding_rate: 0.0,
            funding_curvature: 0.0,
            open_interest: 0.0,
            oi_delta: 0.0,
            basis: 0.0,
            mark_stress: 0.0,
            liquidation_density: 0.0,
            spread: 0.0,
            spread_velocity: 0.0,
            impact_coefficient: 0.0,
            action_integral: 0.0,
        }
    }

    #[test]
    fn edge_score_is_bounded() {
        let synth = EdgeSynthesizer::new(EdgeConfig::default());
        let mut features = flat_features();
        features.ofi = 1e9;
        features.cvd = 1e9;
        features.imbalance_1 = 1.0;
        assert_eq!(synth.edge_score(&features), EDGE_MAX);

        features.ofi = -1e9;
        features.cvd = -1e9;
        features.imbalance_1 = -1.0;
        assert_eq!(synth.edge_score(&features), EDGE_MIN);
    }

    #[test]
    fn positive_flow_raises_edge() {
        let synth = EdgeSynthesizer::new(EdgeConfig::default());
        let base = flat_features();
        let mut bullish = flat_features();
        bullish.ofi = 0.05;
        bullish.cvd = 0.03;
        bullish.imbalance_1 = 0.5;
        assert!(synth.edge_score(&bullish) > synth.edge_score(&base));
    }

    #[test]
    fn stress_lowers_edge() {
        let synth = EdgeSynthesizer::new(EdgeConfig::default());
        let base = flat_features();
        let mut stressed = flat_features();
        stressed.mark_stress = 0.1;
        stressed.impact_coefficient = 5.0;
        assert!(synth.edge_score(&stressed) < synth.edge_score(&base));
    }

    #[test]
    fn degenerate_scale_contributes_zero() {
        let mut config = EdgeConfig::default();
        config.scales.ofi.scale = 0.0;
        let synth = EdgeSynthesizer::new(config);
        let mut features = flat_features();
        features.ofi = 100.0;
        let with_ofi = synth.edge_score(&features);
        features.ofi = 0.0;
        let without_ofi = synth.edge_score(&features);
        assert_eq!(with_ofi, without_ofi);
    }

    #[test]
    fn synthesize_populates_snapshot() {
        let synth = EdgeSynthesizer::new(EdgeConfig::default());
        let snapshot = synth.synthesize("BTCUSDT", Utc::now(), flat_features());
        assert_eq!(snapshot.symbol, "BTCUSDT");
        assert!((EDGE_MIN..=EDGE_MAX).contains(&snapshot.edge_score));
        assert!((0.0..=1.0).contains(&snapshot.entropy));
    }
}
