//! Range-position imbalance.
//!
//! Where within its high-low range each bar closed, averaged over a window
//! and remapped from [0, 1] to [-1, 1]. Closes pinned to the high read as
//! buying pressure (+1), closes pinned to the low as selling pressure (-1).

use super::math::close_position;
use crate::domain::Candle;

/// Average close position over the last `window` bars, mapped to [-1, 1].
pub fn range_position(candles: &[Candle], window: usize) -> f64 {
    if candles.is_empty() {
        return 0.0;
    }
    let len = window.min(candles.len()).max(1);
    let tail = &candles[candles.len() - len..];
    let mean: f64 = tail
        .iter()
        .map(|c| close_position(c.high, c.low, c.close))
        .sum::<f64>()
        / len as f64;
    2.0 * (mean - 0.5)
}
