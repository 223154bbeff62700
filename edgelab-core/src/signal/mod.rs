//! Signal generation — converts a snapshot into directional intent.
//!
//! Stateless and portfolio-agnostic: the generator sees only the snapshot,
//! never ledger or funds state. All-or-nothing directional gates: either
//! every flow feature agrees on a direction under acceptable stress, or no
//! signal is emitted — there are no partial signals.

use crate::config::{SignalConfig, StrategyBoost};
use crate::domain::{Direction, FeatureVector, MicrostructureSnapshot, Signal};
use crate::features::math::clip;

/// Applies directional-consistency rules and converts edge + entropy into a
/// signal with confidence and a size damping factor.
#[derive(Debug, Clone, Default)]
pub struct SignalGenerator {
    config: SignalConfig,
}

impl SignalGenerator {
    pub fn new(config: SignalConfig) -> Self {
        Self { config }
    }

    /// Evaluate a snapshot. `None` when the edge is too small or the gates
    /// disagree.
    pub fn evaluate(&self, snapshot: &MicrostructureSnapshot) -> Option<Signal> {
        let cfg = &self.config;
        let f = &snapshot.features;

        if snapshot.edge_score.abs() < cfg.min_edge {
            return None;
        }

        let calm = f.mark_stress < cfg.max_mark_stress && f.impact_coefficient < cfg.max_impact;
        let long_gate = calm
            && f.imbalance_1 > 0.0
            && f.ofi > 0.0
            && f.cvd > 0.0
            && f.oi_delta > 0.0;
        let short_gate = calm
            && f.imbalance_1 < 0.0
            && f.ofi < 0.0
            && f.cvd < 0.0
            && f.oi_delta < 0.0;

        let direction = match (long_gate, short_gate) {
            (true, _) => Direction::Long,
            (_, true) => Direction::Short,
            _ => return None,
        };

        let boost = self.strategy_boost(f);
        let confidence = self.confidence(snapshot, boost);
        let size_factor = self.size_factor(f, boost);

        Some(Signal {
            direction,
            confidence,
            size_factor,
            rationale: rationale(direction, snapshot),
        })
    }

    /// The deployment-specific confidence term (weight 0.2 by default).
    fn strategy_boost(&self, f: &FeatureVector) -> f64 {
        match self.config.boost {
            StrategyBoost::None => 0.0,
            StrategyBoost::FlowAlignment => {
                let n = &self.config.boost_norms;
                (n.imbalance.normalize(f.imbalance_1.abs())
                    + n.ofi.normalize(f.ofi.abs())
                    + n.cvd.normalize(f.cvd.abs())
                    + n.oi_delta.normalize(f.oi_delta.abs()))
                    / 4.0
            }
        }
    }

    fn confidence(&self, snapshot: &MicrostructureSnapshot, boost: f64) -> f64 {
        let w = self.config.confidence_weights;
        let magnitude = clip(snapshot.edge_score.abs() * 1.5, 0.0, 1.0);
        let entropy_damp = clip(1.0 - snapshot.entropy, 0.0, 1.0);
        let path = clip(snapshot.features.action_integral.abs().tanh(), 0.0, 1.0);
        clip(
            w.magnitude * magnitude + w.entropy_damp * entropy_damp + w.path * path + w.boost * boost,
            0.0,
            1.0,
        )
    }

    fn size_factor(&self, f: &FeatureVector, boost: f64) -> f64 {
        let p = self.config.penalty;
        let penalty = clip(
            0.25 * p.mark_stress.normalize(f.mark_stress)
                + 0.25 * p.liquidation_density.normalize(f.liquidation_density)
                + 0.25 * p.impact.normalize(f.impact_coefficient)
                + 0.25 * (1.0 - boost),
            0.0,
            p.cap,
        );
        clip(1.0 - penalty, self.config.size_floor, 1.0)
    }
}

fn rationale(direction: Direction, snapshot: &MicrostructureSnapshot) -> String {
    let f = &snapshot.features;
    format!(
        "{} ib:{:.3} ofi:{:.3} cvd:{:.3} doi:{:.2} stress:{:.4} impact:{:.3} edge:{:.4} entropy:{:.2}",
        direction,
        f.imbalance_1,
        f.ofi,
        f.cvd,
        f.oi_delta,
        f.mark_stress,
        f.impact_coefficient,
        snapshot.edge_score,
        snapshot.entropy,
    )
}
