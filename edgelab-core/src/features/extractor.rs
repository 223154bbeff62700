//! FeatureExtractor — derives the full microstructure feature vector.

use super::{flow, funding, imbalance, impact, open_interest, path, stress};
use crate::config::FeatureConfig;
use crate::domain::{Candle, FeatureVector};

/// Derives microstructure proxies from an ordered candle series.
///
/// Pure: same candles in, same features out. Below `min_candles` (default 30)
/// extraction returns `None` — callers treat that as "no snapshot this
/// cycle", never as an error.
#[derive(Debug, Clone, Default)]
pub struct FeatureExtractor {
    config: FeatureConfig,
}

impl FeatureExtractor {
    pub fn new(config: FeatureConfig) -> Self {
        Self { config }
    }

    pub fn min_candles(&self) -> usize {
        self.config.min_candles
    }

    /// Extract the feature vector, or `None` when the series is too short.
    pub fn extract(&self, candles: &[Candle]) -> Option<FeatureVector> {
        let cfg = &self.config;
        if candles.len() < cfg.min_candles {
            return None;
        }

        let (ofi, cvd) = flow::flow_imbalance(candles, cfg.ofi_window, cfg.volume_norm_window);
        let (funding_rate, funding_curvature) =
            funding::funding_proxies(candles, cfg.funding_fast, cfg.funding_slow, cfg.curvature_tail);
        let (open_interest, oi_delta) = open_interest::open_interest_proxies(candles, cfg.oi_alpha);
        let (basis, mark_stress) = stress::basis_and_stress(candles, cfg.basis_window);
        let (spread, spread_velocity) = stress::spread_proxies(candles);

        Some(FeatureVector {
            imbalance_1: imbalance::range_position(candles, 1),
            imbalance_5: imbalance::range_position(candles, 5),
            imbalance_20: imbalance::range_position(candles, 20),
            ofi,
            cvd,
            funding_rate,
            funding_curvature,
            open_interest,
            oi_delta,
            basis,
            mark_stress,
            liquidation_density: stress::liquidation_density(candles, cfg.liquidation_window),
            spread,
            spread_velocity,
            impact_coefficient: impact::price_impact(candles, cfg.impact_clip),
            action_integral: path::action_integral(candles),
        })
    }
}
