//! Shared numeric helpers for feature extraction.
//!
//! Every division that could hit a zero denominator goes through
//! [`safe_div`], so no non-finite value can leave the extractor.

/// Smallest denominator substituted for zero.
pub const EPSILON: f64 = 1e-9;

/// Clip `x` into `[low, high]`.
pub fn clip(x: f64, low: f64, high: f64) -> f64 {
    x.clamp(low, high)
}

/// Division with an epsilon-guarded denominator. Preserves the denominator's
/// sign when it is merely tiny rather than zero.
pub fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator.abs() < EPSILON {
        numerator / EPSILON.copysign(denominator)
    } else {
        numerator / denominator
    }
}

/// Mean of the last `window` values (or all values if fewer).
pub fn sma_last(values: &[f64], window: usize) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let len = window.min(values.len()).max(1);
    let tail = &values[values.len() - len..];
    tail.iter().sum::<f64>() / len as f64
}

/// Expanding-then-rolling SMA series: index `i` holds the mean of the last
/// `window` values up to and including `i` (fewer while warming up).
pub fn sma_series(values: &[f64], window: usize) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    for i in 0..values.len() {
        let start = i.saturating_sub(window.saturating_sub(1));
        let slice = &values[start..=i];
        out.push(slice.iter().sum::<f64>() / slice.len() as f64);
    }
    out
}

/// Recursive EMA seeded from the first sample:
/// `ema[0] = values[0]`, `ema[t] = alpha * values[t] + (1 - alpha) * ema[t-1]`.
pub fn ema_series(values: &[f64], alpha: f64) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    let mut prev = values.first().copied().unwrap_or(0.0);
    for &v in values {
        let ema = alpha * v + (1.0 - alpha) * prev;
        out.push(ema);
        prev = ema;
    }
    out
}

/// Unscaled second difference of the last three values:
/// `x[n-1] - 2*x[n-2] + x[n-3]`. Zero when fewer than three values.
pub fn second_difference(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 3 {
        return 0.0;
    }
    values[n - 1] - 2.0 * values[n - 2] + values[n - 3]
}

/// Position of the close within the bar's range, in [0, 1].
pub fn close_position(high: f64, low: f64, close: f64) -> f64 {
    let range = (high - low).max(EPSILON);
    clip((close - low) / range, 0.0, 1.0)
}
