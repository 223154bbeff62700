//! Candle provider trait and structured error types.
//!
//! Abstracts over candle sources (REST klines, CSV import, synthetic) so the
//! engine can swap implementations and tests can run offline. The engine
//! treats every provider failure identically: no snapshot this cycle.

use crate::domain::Candle;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Supported candle intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CandleInterval {
    OneMinute,
    FiveMinutes,
    OneHour,
    OneDay,
}

impl CandleInterval {
    /// Wire name used by kline-style REST endpoints.
    pub fn as_str(&self) -> &'static str {
        match self {
            CandleInterval::OneMinute => "1m",
            CandleInterval::FiveMinutes => "5m",
            CandleInterval::OneHour => "1h",
            CandleInterval::OneDay => "1d",
        }
    }

    pub fn seconds(&self) -> i64 {
        match self {
            CandleInterval::OneMinute => 60,
            CandleInterval::FiveMinutes => 300,
            CandleInterval::OneHour => 3_600,
            CandleInterval::OneDay => 86_400,
        }
    }
}

impl fmt::Display for CandleInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured error types for data operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("provider has blocked requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("data error: {0}")]
    Other(String),
}

/// Trait for candle providers.
///
/// `fetch` returns candles ordered most-recent-last. Implementations handle
/// source specifics; callers never retry in a loop — a failed fetch means a
/// skipped cycle, not a retry storm.
pub trait CandleProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    fn fetch(
        &self,
        symbol: &str,
        interval: CandleInterval,
        limit: usize,
    ) -> Result<Vec<Candle>, DataError>;
}
