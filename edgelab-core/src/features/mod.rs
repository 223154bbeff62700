//! Microstructure feature extraction.
//!
//! One proxy family per module, each a pure function over `&[Candle]` with
//! epsilon-guarded divisions and documented clips. `FeatureExtractor` ties
//! them together into a `FeatureVector`.

pub mod extractor;
pub mod flow;
pub mod funding;
pub mod imbalance;
pub mod impact;
pub mod math;
pub mod open_interest;
pub mod path;
pub mod stress;

pub use extractor::FeatureExtractor;

#[cfg(test)]
pub(crate) mod testutil {
    use crate::domain::Candle;
    use chrono::{Duration, TimeZone, Utc};

    /// Single candle with explicit OHLCV.
    pub fn make_candle(open: f64, high: f64, low: f64, close: f64, volume: f64) -> Candle {
        Candle {
            open_time: Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Candle series from closes; each bar gets a small symmetric range and
    /// unit-scale volume.
    pub fn candles_from_closes(closes: &[f64]) -> Vec<Candle> {
        candles_with_volumes(&closes.iter().map(|&c| (c, 1_000.0)).collect::<Vec<_>>())
    }

    /// Candle series from (close, volume) pairs.
    pub fn candles_with_volumes(bars: &[(f64, f64)]) -> Vec<Candle> {
        let start = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        bars.iter()
            .enumerate()
            .map(|(i, &(close, volume))| {
                let open = if i == 0 { close } else { bars[i - 1].0 };
                Candle {
                    open_time: start + Duration::minutes(i as i64),
                    open,
                    high: open.max(close) + 0.25,
                    low: open.min(close) - 0.25,
                    close,
                    volume,
                }
            })
            .collect()
    }

    /// Steadily rising series with closes near the bar highs, the shape the
    /// long gate expects.
    pub fn trending_candles(n: usize, start_price: f64, step: f64) -> Vec<Candle> {
        let start = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        (0..n)
            .map(|i| {
                let close = start_price + step * i as f64;
                let open = close - step;
                Candle {
                    open_time: start + Duration::minutes(i as i64),
                    open,
                    high: close + 0.05,
                    low: open - 0.05,
                    close,
                    volume: 1_000.0 + 10.0 * i as f64,
                }
            })
            .collect()
    }
}
