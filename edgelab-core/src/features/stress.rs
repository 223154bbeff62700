//! Basis, mark stress, liquidation density, and spread proxies.

use super::math::{safe_div, sma_last, EPSILON};
use crate::domain::Candle;

/// Returns `(basis, mark_stress)`.
///
/// Basis: `(last_close - SMA) / last_close`. Mark stress: the last bar's
/// range relative to its close — a spot proxy for mark/index divergence.
pub fn basis_and_stress(candles: &[Candle], basis_window: usize) -> (f64, f64) {
    let Some(last) = candles.last() else {
        return (0.0, 0.0);
    };
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let sma = sma_last(&closes, basis_window);
    let basis = safe_div(last.close - sma, last.close);
    let mark_stress = safe_div(last.range(), last.close).abs();
    (basis, mark_stress)
}

/// Mean wick fraction over the last `window` bars: large wicks mark price
/// levels where forced flow concentrated.
pub fn liquidation_density(candles: &[Candle], window: usize) -> f64 {
    if candles.is_empty() || window == 0 {
        return 0.0;
    }
    let len = window.min(candles.len());
    let tail = &candles[candles.len() - len..];
    let total: f64 = tail
        .iter()
        .map(|c| (c.upper_wick() + c.lower_wick()) / c.close.max(EPSILON))
        .sum();
    total / window as f64
}

/// Returns `(spread, spread_velocity)`: the last bar's high-low range and its
/// relative change versus the previous bar.
pub fn spread_proxies(candles: &[Candle]) -> (f64, f64) {
    let n = candles.len();
    if n == 0 {
        return (0.0, 0.0);
    }
    let spread = candles[n - 1].range();
    if n < 2 {
        return (spread, 0.0);
    }
    let prev = candles[n - 2].range();
    (spread, safe_div(spread - prev, prev))
}
