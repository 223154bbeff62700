//! CSV candle import.
//!
//! Reads candles from a headered CSV file with columns
//! `open_time,open,high,low,close,volume`, where `open_time` is epoch
//! milliseconds. The primary offline path when no REST endpoint is reachable.

use super::provider::{CandleInterval, CandleProvider, DataError};
use crate::domain::Candle;
use chrono::{TimeZone, Utc};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct CsvRow {
    open_time: i64,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

/// Serves candles from `<dir>/<symbol>.csv`. The interval is whatever the
/// file was exported at; `fetch` returns the last `limit` rows.
pub struct CsvProvider {
    dir: PathBuf,
}

impl CsvProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}.csv"))
    }
}

/// Parse a candle CSV file, validating order and sanity.
pub fn read_candles(path: &Path) -> Result<Vec<Candle>, DataError> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| DataError::Io(e.to_string()))?;

    let mut candles = Vec::new();
    for (line, row) in reader.deserialize::<CsvRow>().enumerate() {
        let row = row.map_err(|e| DataError::ValidationError(format!("row {line}: {e}")))?;
        let open_time = Utc
            .timestamp_millis_opt(row.open_time)
            .single()
            .ok_or_else(|| {
                DataError::ValidationError(format!("row {line}: bad timestamp {}", row.open_time))
            })?;
        let candle = Candle {
            open_time,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
        };
        if !candle.is_sane() {
            return Err(DataError::ValidationError(format!("row {line}: insane candle")));
        }
        candles.push(candle);
    }

    if candles.windows(2).any(|w| w[0].open_time >= w[1].open_time) {
        return Err(DataError::ValidationError(
            "candles are not strictly ordered by open time".into(),
        ));
    }

    Ok(candles)
}

impl CandleProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv"
    }

    fn fetch(
        &self,
        symbol: &str,
        _interval: CandleInterval,
        limit: usize,
    ) -> Result<Vec<Candle>, DataError> {
        let path = self.path_for(symbol);
        if !path.exists() {
            return Err(DataError::SymbolNotFound { symbol: symbol.to_string() });
        }
        let candles = read_candles(&path)?;
        let start = candles.len().saturating_sub(limit);
        Ok(candles[start..].to_vec())
    }
}
