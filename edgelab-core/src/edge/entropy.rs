//! Feature-disagreement entropy.
//!
//! Each feature value is tanh-compressed, mapped to [0, 1], and bucketed
//! into 7 equal-width bins; Shannon entropy over bin occupancy normalized by
//! ln(7) gives a disagreement measure in [0, 1]. Coherent features cluster
//! into few bins (low entropy); conflicting features spread out (high).

use crate::features::math::clip;

const BINS: usize = 7;

pub fn feature_entropy(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let mut bins = [0usize; BINS];
    for &v in values {
        let compressed = clip((v.tanh() + 1.0) / 2.0, 0.0, 1.0);
        let idx = ((compressed * BINS as f64) as usize).min(BINS - 1);
        bins[idx] += 1;
    }

    let total = values.len() as f64;
    let mut h = 0.0;
    for &count in &bins {
        if count == 0 {
            continue;
        }
        let p = count as f64 / total;
        h -= p * (p + 1e-12).ln();
    }

    clip(h / (BINS as f64).ln(), 0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Value whose tanh-compressed image lands in the middle of bin `k`.
    fn value_for_bin(k: usize) -> f64 {
        let c = (k as f64 + 0.5) / BINS as f64;
        (2.0 * c - 1.0).atanh()
    }

    #[test]
    fn identical_values_have_zero_entropy() {
        let values = [0.3; 14];
        assert_eq!(feature_entropy(&values), 0.0);
    }

    #[test]
    fn uniform_spread_has_unit_entropy() {
        // two values per bin across all seven bins
        let mut values = Vec::new();
        for k in 0..BINS {
            values.push(value_for_bin(k));
            values.push(value_for_bin(k));
        }
        assert!((feature_entropy(&values) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn spread_raises_entropy() {
        let coherent = [0.1, 0.12, 0.09, 0.11];
        let conflicting = [value_for_bin(0), value_for_bin(2), value_for_bin(4), value_for_bin(6)];
        assert!(feature_entropy(&conflicting) > feature_entropy(&coherent));
    }

    #[test]
    fn entropy_is_bounded() {
        let extreme = [-1e6, 1e6, 0.0, -0.5, 0.5, 3.0, -3.0];
        let h = feature_entropy(&extreme);
        assert!((0.0..=1.0).contains(&h));
    }

    #[test]
    fn empty_input_is_zero() {
        assert_eq!(feature_entropy(&[]), 0.0);
    }

    #[test]
    fn extreme_values_saturate_into_edge_bins() {
        // tanh collapses huge magnitudes into the outermost bins
        let values = [1e9, 2e9, -1e9, -2e9];
        let h = feature_entropy(&values);
        // two bins evenly occupied: H = ln 2 / ln 7
        assert!((h - (2.0_f64).ln() / 7.0_f64.ln()).abs() < 1e-9);
    }
}
