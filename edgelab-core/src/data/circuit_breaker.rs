//! Provider-side circuit breaker.
//!
//! Protects against hammering a market-data endpoint after a ban or repeated
//! rate limits. Unrelated to the trading risk breaker: this one guards an
//! external service, trips on consecutive fetch failures, and heals itself
//! after a cooldown.

use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
enum Gate {
    Closed { consecutive_failures: u32 },
    Open { tripped_at: Instant },
}

#[derive(Debug)]
pub struct ProviderBreaker {
    gate: Mutex<Gate>,
    cooldown: Duration,
    failure_threshold: u32,
}

impl ProviderBreaker {
    pub fn new(cooldown: Duration, failure_threshold: u32) -> Self {
        Self {
            gate: Mutex::new(Gate::Closed { consecutive_failures: 0 }),
            cooldown,
            failure_threshold: failure_threshold.max(1),
        }
    }

    /// Default policy: trip after 3 consecutive failures, 5-minute cooldown.
    pub fn default_policy() -> Self {
        Self::new(Duration::from_secs(5 * 60), 3)
    }

    /// Whether a request may proceed. An expired cooldown heals the breaker.
    pub fn is_allowed(&self) -> bool {
        let mut gate = self.gate.lock().expect("breaker lock poisoned");
        match *gate {
            Gate::Closed { .. } => true,
            Gate::Open { tripped_at } => {
                if tripped_at.elapsed() >= self.cooldown {
                    *gate = Gate::Closed { consecutive_failures: 0 };
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn record_success(&self) {
        let mut gate = self.gate.lock().expect("breaker lock poisoned");
        if let Gate::Closed { ref mut consecutive_failures } = *gate {
            *consecutive_failures = 0;
        }
    }

    pub fn record_failure(&self) {
        let mut gate = self.gate.lock().expect("breaker lock poisoned");
        if let Gate::Closed { consecutive_failures } = *gate {
            let failures = consecutive_failures + 1;
            *gate = if failures >= self.failure_threshold {
                Gate::Open { tripped_at: Instant::now() }
            } else {
                Gate::Closed { consecutive_failures: failures }
            };
        }
    }

    /// Trip immediately (e.g. on an explicit ban response).
    pub fn trip(&self) {
        *self.gate.lock().expect("breaker lock poisoned") =
            Gate::Open { tripped_at: Instant::now() };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_closed() {
        let breaker = ProviderBreaker::new(Duration::from_secs(60), 3);
        assert!(breaker.is_allowed());
    }

    #[test]
    fn trips_after_threshold_failures() {
        let breaker = ProviderBreaker::new(Duration::from_secs(60), 3);
        breaker.record_failure();
        breaker.record_failure();
        assert!(breaker.is_allowed());
        breaker.record_failure();
        assert!(!breaker.is_allowed());
    }

    #[test]
    fn success_resets_the_count() {
        let breaker = ProviderBreaker::new(Duration::from_secs(60), 3);
        breaker.record_failure();
        breaker.record_failure();
        breaker.record_success();
        breaker.record_failure();
        assert!(breaker.is_allowed());
    }

    #[test]
    fn explicit_trip_blocks() {
        let breaker = ProviderBreaker::new(Duration::from_secs(60), 3);
        breaker.trip();
        assert!(!breaker.is_allowed());
    }

    #[test]
    fn heals_after_cooldown() {
        let breaker = ProviderBreaker::new(Duration::from_millis(10), 3);
        breaker.trip();
        assert!(!breaker.is_allowed());
        std::thread::sleep(Duration::from_millis(15));
        assert!(breaker.is_allowed());
    }
}
