//! Candle — the fundamental market data unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OHLCV candle for a single symbol over a single interval.
///
/// Candle sequences are ordered most-recent-last and immutable once ingested.
/// Volume is `f64` because perpetual-futures venues report fractional base
/// quantities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candle {
    pub open_time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// High-low range of the bar.
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// Wick above the candle body.
    pub fn upper_wick(&self) -> f64 {
        (self.high - self.open.max(self.close)).max(0.0)
    }

    /// Wick below the candle body.
    pub fn lower_wick(&self) -> f64 {
        (self.open.min(self.close) - self.low).max(0.0)
    }

    /// Returns true if any OHLCV field is NaN.
    pub fn is_void(&self) -> bool {
        self.open.is_nan()
            || self.high.is_nan()
            || self.low.is_nan()
            || self.close.is_nan()
            || self.volume.is_nan()
    }

    /// Basic OHLCV sanity check: high >= low, range contains open and close,
    /// prices positive, volume non-negative.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.open > 0.0
            && self.close > 0.0
            && self.volume >= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_candle() -> Candle {
        Candle {
            open_time: Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
            open: 100.0,
            high: 105.0,
            low: 98.0,
            close: 103.0,
            volume: 50_000.0,
        }
    }

    #[test]
    fn candle_is_sane() {
        assert!(sample_candle().is_sane());
    }

    #[test]
    fn candle_detects_void() {
        let mut candle = sample_candle();
        candle.close = f64::NAN;
        assert!(candle.is_void());
        assert!(!candle.is_sane());
    }

    #[test]
    fn candle_detects_insane_high_low() {
        let mut candle = sample_candle();
        candle.high = 97.0; // below low
        assert!(!candle.is_sane());
    }

    #[test]
    fn wick_measurements() {
        let candle = sample_candle();
        // body spans 100..103, so upper wick = 105-103, lower wick = 100-98
        assert_eq!(candle.upper_wick(), 2.0);
        assert_eq!(candle.lower_wick(), 2.0);
        assert_eq!(candle.range(), 7.0);
    }

    #[test]
    fn candle_serialization_roundtrip() {
        let candle = sample_candle();
        let json = serde_json::to_string(&candle).unwrap();
        let deser: Candle = serde_json::from_str(&json).unwrap();
        assert_eq!(candle.open_time, deser.open_time);
        assert_eq!(candle.close, deser.close);
        assert_eq!(candle.volume, deser.volume);
    }
}
