//! Price-impact coefficient (Kyle's-lambda proxy).
//!
//! `|last return| / last volume`, clipped to a configured ceiling. High
//! lambda means thin liquidity: each traded unit moves price further.

use super::math::{clip, safe_div, EPSILON};
use crate::domain::Candle;

pub fn price_impact(candles: &[Candle], clip_hi: f64) -> f64 {
    let n = candles.len();
    if n < 2 {
        return 0.0;
    }
    let ret = safe_div(candles[n - 1].close - candles[n - 2].close, candles[n - 2].close);
    let volume = candles[n - 1].volume.max(EPSILON);
    clip(ret.abs() / volume, 0.0, clip_hi)
}
