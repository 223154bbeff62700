//! REST klines provider.
//!
//! Fetches OHLCV candles from a Binance-compatible `/api/v3/klines` endpoint:
//! a JSON array of arrays, numeric fields encoded as strings. Handles retry
//! with exponential backoff, rate-limit responses, and the provider-side
//! circuit breaker.

use super::circuit_breaker::ProviderBreaker;
use super::provider::{CandleInterval, CandleProvider, DataError};
use crate::domain::Candle;
use chrono::{TimeZone, Utc};
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.binance.com";

pub struct RestProvider {
    client: reqwest::blocking::Client,
    base_url: String,
    breaker: Arc<ProviderBreaker>,
    max_retries: u32,
    base_delay: Duration,
}

impl RestProvider {
    pub fn new(base_url: impl Into<String>, breaker: Arc<ProviderBreaker>) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .expect("failed to build HTTP client");

        Self {
            client,
            base_url: base_url.into(),
            breaker,
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        }
    }

    fn fetch_once(
        &self,
        symbol: &str,
        interval: CandleInterval,
        limit: usize,
    ) -> Result<Vec<Candle>, DataError> {
        let url = format!(
            "{}/api/v3/klines?symbol={}&interval={}&limit={}",
            self.base_url, symbol, interval, limit
        );

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| DataError::NetworkUnreachable(e.to_string()))?;

        match response.status().as_u16() {
            200 => {}
            404 | 400 => {
                return Err(DataError::SymbolNotFound { symbol: symbol.to_string() });
            }
            429 => {
                let retry_after_secs = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(60);
                return Err(DataError::RateLimited { retry_after_secs });
            }
            403 | 418 => {
                // the venue uses these for bans; stop asking for a while
                self.breaker.trip();
                return Err(DataError::CircuitBreakerTripped);
            }
            status => {
                return Err(DataError::Other(format!("unexpected status {status}")));
            }
        }

        let rows: Vec<Vec<serde_json::Value>> = response
            .json()
            .map_err(|e| DataError::ResponseFormatChanged(e.to_string()))?;

        rows.iter().map(parse_kline_row).collect()
    }
}

/// One kline row: `[open_time_ms, open, high, low, close, volume, ...]`,
/// prices and volume as strings.
fn parse_kline_row(row: &Vec<serde_json::Value>) -> Result<Candle, DataError> {
    if row.len() < 6 {
        return Err(DataError::ResponseFormatChanged(format!(
            "kline row has {} fields, expected at least 6",
            row.len()
        )));
    }

    let open_time_ms = row[0]
        .as_i64()
        .ok_or_else(|| DataError::ResponseFormatChanged("open time is not an integer".into()))?;
    let open_time = Utc
        .timestamp_millis_opt(open_time_ms)
        .single()
        .ok_or_else(|| DataError::ResponseFormatChanged("open time out of range".into()))?;

    let number = |idx: usize, name: &str| -> Result<f64, DataError> {
        row[idx]
            .as_str()
            .and_then(|s| s.parse::<f64>().ok())
            .or_else(|| row[idx].as_f64())
            .ok_or_else(|| DataError::ResponseFormatChanged(format!("{name} is not numeric")))
    };

    let candle = Candle {
        open_time,
        open: number(1, "open")?,
        high: number(2, "high")?,
        low: number(3, "low")?,
        close: number(4, "close")?,
        volume: number(5, "volume")?,
    };

    if !candle.is_sane() {
        return Err(DataError::ValidationError(format!(
            "insane candle at {open_time_ms}"
        )));
    }
    Ok(candle)
}

impl CandleProvider for RestProvider {
    fn name(&self) -> &str {
        "rest-klines"
    }

    fn fetch(
        &self,
        symbol: &str,
        interval: CandleInterval,
        limit: usize,
    ) -> Result<Vec<Candle>, DataError> {
        if !self.breaker.is_allowed() {
            return Err(DataError::CircuitBreakerTripped);
        }

        let mut last_error = DataError::Other("no attempts made".into());
        for attempt in 0..self.max_retries {
            match self.fetch_once(symbol, interval, limit) {
                Ok(candles) => {
                    self.breaker.record_success();
                    return Ok(candles);
                }
                // not worth retrying: the answer won't change
                Err(e @ DataError::SymbolNotFound { .. })
                | Err(e @ DataError::CircuitBreakerTripped)
                | Err(e @ DataError::ValidationError(_)) => {
                    return Err(e);
                }
                Err(e) => {
                    self.breaker.record_failure();
                    last_error = e;
                    if attempt + 1 < self.max_retries {
                        std::thread::sleep(self.base_delay * 2u32.pow(attempt));
                    }
                }
            }
        }
        Err(last_error)
    }
}
