//! Open-interest proxy.
//!
//! Without a futures OI endpoint, a smoothed volume level stands in:
//! EMA of volume (recursive from the first sample) and its last increment.

use super::math::ema_series;
use crate::domain::Candle;

/// Returns `(open_interest, oi_delta)`.
pub fn open_interest_proxies(candles: &[Candle], alpha: f64) -> (f64, f64) {
    if candles.is_empty() {
        return (0.0, 0.0);
    }
    let volumes: Vec<f64> = candles.iter().map(|c| c.volume).collect();
    let ema = ema_series(&volumes, alpha);
    let last = *ema.last().expect("non-empty by construction");
    let delta = if ema.len() >= 2 {
        last - ema[ema.len() - 2]
    } else {
        0.0
    };
    (last, delta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::testutil::candles_with_volumes;

    #[test]
    fn constant_volume_has_zero_delta() {
        let candles = candles_with_volumes(&[(100.0, 500.0); 10]);
        let (oi, delta) = open_interest_proxies(&candles, 0.2);
        assert!((oi - 500.0).abs() < 1e-9);
        assert!(delta.abs() < 1e-9);
    }

    #[test]
    fn volume_spike_gives_positive_delta() {
        let mut bars = vec![(100.0, 500.0); 9];
        bars.push((100.0, 5000.0));
        let candles = candles_with_volumes(&bars);
        let (oi, delta) = open_interest_proxies(&candles, 0.2);
        assert!(delta > 0.0);
        assert!(oi > 500.0);
    }

    #[test]
    fn volume_collapse_gives_negative_delta() {
        let mut bars = vec![(100.0, 5000.0); 9];
        bars.push((100.0, 100.0));
        let candles = candles_with_volumes(&bars);
        let (_, delta) = open_interest_proxies(&candles, 0.2);
        assert!(delta < 0.0);
    }

    #[test]
    fn single_bar_has_zero_delta() {
        let candles = candles_with_volumes(&[(100.0, 500.0)]);
        let (oi, delta) = open_interest_proxies(&candles, 0.2);
        assert!((oi - 500.0).abs() < 1e-9);
        assert_eq!(delta, 0.0);
    }
}
