//! Funding-rate proxy and curvature.
//!
//! Without a live funding endpoint, mean-reversion pressure between a fast
//! and slow SMA of closes stands in for the funding rate:
//! `(SMA_fast.last - SMA_slow.last) / SMA_slow.last`, clipped to [-2%, 2%].
//! Curvature is the second difference over the tail of the fast SMA series,
//! clipped to [-0.5%, 0.5%].

use super::math::{clip, safe_div, second_difference, sma_series};
use crate::domain::Candle;

/// Returns `(funding_rate, funding_curvature)`.
pub fn funding_proxies(
    candles: &[Candle],
    fast: usize,
    slow: usize,
    curvature_tail: usize,
) -> (f64, f64) {
    if candles.is_empty() {
        return (0.0, 0.0);
    }
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let fast_series = sma_series(&closes, fast);
    let slow_series = sma_series(&closes, slow);

    let fast_last = *fast_series.last().expect("non-empty by construction");
    let slow_last = *slow_series.last().expect("non-empty by construction");
    let funding_rate = clip(safe_div(fast_last - slow_last, slow_last), -0.02, 0.02);

    let tail_start = fast_series.len().saturating_sub(curvature_tail);
    let curvature = clip(second_difference(&fast_series[tail_start..]), -0.005, 0.005);

    (funding_rate, curvature)
}
