//! Synthetic candle generator.
//!
//! A seeded random walk for offline runs and tests. Fully deterministic: the
//! same master seed, symbol, and fetch index always produce the same series.
//! Each fetch advances an internal counter so consecutive cycles see fresh
//! (but still reproducible) data.

use super::provider::{CandleInterval, CandleProvider, DataError};
use crate::domain::Candle;
use crate::rng::SeedHierarchy;
use chrono::{Duration, TimeZone, Utc};
use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};

pub struct SyntheticProvider {
    seeds: SeedHierarchy,
    start_price: f64,
    /// Per-bar return scale (e.g. 0.002 = 0.2%).
    step_pct: f64,
    base_volume: f64,
    calls: AtomicU64,
}

impl SyntheticProvider {
    pub fn new(seeds: SeedHierarchy) -> Self {
        Self {
            seeds,
            start_price: 100.0,
            step_pct: 0.002,
            base_volume: 1_000.0,
            calls: AtomicU64::new(0),
        }
    }

    pub fn with_params(seeds: SeedHierarchy, start_price: f64, step_pct: f64, base_volume: f64) -> Self {
        Self {
            seeds,
            start_price,
            step_pct,
            base_volume,
            calls: AtomicU64::new(0),
        }
    }

    fn generate(&self, symbol: &str, fetch_index: u64, interval: CandleInterval, limit: usize) -> Vec<Candle> {
        let mut rng = self.seeds.rng(symbol, fetch_index);
        let genesis = Utc.timestamp_opt(1_700_000_000, 0).single().expect("fixed epoch is valid");
        let start_time = genesis + Duration::seconds(fetch_index as i64 * interval.seconds());

        // drift persists across the fetch so trends can form
        let drift = self.step_pct * (rng.gen::<f64>() - 0.5);

        let mut close = self.start_price;
        let mut candles = Vec::with_capacity(limit);
        for i in 0..limit {
            let open = close;
            // sum of three uniforms approximates a bounded normal
            let noise = rng.gen::<f64>() + rng.gen::<f64>() + rng.gen::<f64>() - 1.5;
            close = (open * (1.0 + drift + self.step_pct * noise)).max(1e-6);

            let wick = self.step_pct * rng.gen::<f64>() * 0.5;
            let high = open.max(close) * (1.0 + wick);
            let low = open.min(close) * (1.0 - wick);
            let volume = self.base_volume * (0.5 + rng.gen::<f64>());

            candles.push(Candle {
                open_time: start_time + Duration::seconds(i as i64 * interval.seconds()),
                open,
                high,
                low,
                close,
                volume,
            });
        }
        candles
    }
}

impl CandleProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch(
        &self,
        symbol: &str,
        interval: CandleInterval,
        limit: usize,
    ) -> Result<Vec<Candle>, DataError> {
        let fetch_index = self.calls.fetch_add(1, Ordering::Relaxed);
        Ok(self.generate(symbol, fetch_index, interval, limit))
    }
}
