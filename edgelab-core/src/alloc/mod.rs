//! Capital allocation — turns a signal into a bounded capital commitment.
//!
//! The unit bait stake is scaled by a confidence-driven leverage, a bounded
//! Kelly fraction, and the signal's size factor, then capped by the per-trade
//! risk limit. Infeasible trades come back as structured rejections with a
//! reason string, never as errors.

pub mod bracket;

pub use bracket::Bracket;

use crate::config::AllocConfig;
use crate::domain::{Direction, FundsState, Signal};
use crate::features::math::clip;
use crate::risk::CircuitBreakerState;

pub const GOLDEN_RATIO: f64 = 1.618_033_988_749_894;

/// Outcome of an allocation request. `accepted == false` carries a
/// human-readable reason; the numeric fields are zero in that case.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationResult {
    pub accepted: bool,
    /// Notional exposure.
    pub size: f64,
    pub leverage: f64,
    /// Capital to reserve: notional / leverage.
    pub risk_amount: f64,
    pub kelly_fraction: f64,
    pub reason: String,
}

impl AllocationResult {
    fn rejected(reason: String) -> Self {
        Self {
            accepted: false,
            size: 0.0,
            leverage: 0.0,
            risk_amount: 0.0,
            kelly_fraction: 0.0,
            reason,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CapitalAllocator {
    config: AllocConfig,
}

impl CapitalAllocator {
    pub fn new(config: AllocConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AllocConfig {
        &self.config
    }

    /// Map signal strength, alignment, and confidence into the leverage
    /// range via a linear blend with a bounded sinusoidal perturbation.
    pub fn leverage(&self, strength: f64, alignment: f64, confidence: f64) -> f64 {
        let cfg = &self.config;
        let blend = clip(0.5 * strength + 0.3 * alignment + 0.2 * confidence, 0.0, 1.0);
        let base = cfg.min_leverage + blend * (cfg.max_leverage - cfg.min_leverage);
        let resonance = 0.1 * (blend * GOLDEN_RATIO).sin();
        clip(base * (1.0 + resonance), cfg.min_leverage, cfg.max_leverage)
    }

    /// Kelly-style fraction `(p*b - (1-p)) / b`, perturbed by two bounded
    /// oscillatory corrections of the supplied phases, clipped to [0.1, 1.0].
    pub fn kelly_fraction(&self, win_prob: f64, phase_a: f64, phase_b: f64) -> f64 {
        let cfg = &self.config;
        let p = clip(win_prob, 0.0, 1.0);
        let b = cfg.payoff_ratio;
        let basic = (p * b - (1.0 - p)) / b;
        let correction =
            ((phase_a * cfg.osc_freq_a).cos() + (phase_b * cfg.osc_freq_b).sin()) / 2.0;
        clip(basic * (1.0 + 0.1 * correction), 0.1, 1.0)
    }

    /// Allocate capital for a signal.
    ///
    /// `alignment` is the caller's coherence estimate (the runner passes
    /// `1 - entropy`); its complement drives one Kelly oscillator phase so
    /// allocations are a pure function of their inputs.
    pub fn allocate(
        &self,
        signal: &Signal,
        alignment: f64,
        funds: &FundsState,
        breaker: &CircuitBreakerState,
    ) -> AllocationResult {
        let cfg = &self.config;

        if breaker.emergency_stopped {
            let detail = breaker
                .emergency_reason
                .as_deref()
                .unwrap_or("no reason recorded");
            return AllocationResult::rejected(format!("emergency stop active: {detail}"));
        }

        if signal.confidence < cfg.min_confidence {
            return AllocationResult::rejected(format!(
                "confidence {:.2} below minimum {:.2}",
                signal.confidence, cfg.min_confidence
            ));
        }

        let leverage = self.leverage(signal.confidence, alignment, signal.confidence);
        let kelly = self.kelly_fraction(signal.confidence, 1.0 - alignment, signal.confidence);

        let raw_size = cfg.bait_stake * leverage * kelly * signal.size_factor;
        let cap = funds.available_balance * cfg.max_risk_per_trade;
        let size = raw_size.min(cap);
        let risk_amount = size / leverage;

        if size <= 0.0 || funds.available_balance < risk_amount {
            return AllocationResult::rejected(format!(
                "insufficient funds: available {:.2}, required {:.2}",
                funds.available_balance,
                risk_amount.max(0.0)
            ));
        }

        AllocationResult {
            accepted: true,
            size,
            leverage,
            risk_amount,
            kelly_fraction: kelly,
            reason: format!(
                "size {:.4} at {:.1}x (kelly {:.2}, size factor {:.2})",
                size, leverage, kelly, signal.size_factor
            ),
        }
    }

    /// Direction-aware stop/target prices for an accepted allocation.
    pub fn bracket(
        &self,
        entry_price: f64,
        direction: Direction,
        confidence: f64,
        leverage: f64,
    ) -> Bracket {
        bracket::bracket_for(&self.config, entry_price, direction, confidence, leverage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn breaker_ok() -> CircuitBreakerState {
        CircuitBreakerState {
            daily_start_balance: 1000.0,
            emergency_stopped: false,
            emergency_reason: None,
            last_reset_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        }
    }

    fn breaker_tripped() -> CircuitBreakerState {
        CircuitBreakerState {
            emergency_stopped: true,
            emergency_reason: Some("daily loss 12.0% breached emergency level 10.0%".into()),
            ..breaker_ok()
        }
    }

    fn signal(confidence: f64) -> Signal {
        Signal {
            direction: Direction::Long,
            confidence,
            size_factor: 0.8,
            rationale: String::new(),
        }
    }

    #[test]
    fn leverage_stays_in_range() {
        let alloc = CapitalAllocator::default();
        for strength in [0.0, 0.25, 0.5, 0.75, 1.0] {
            for alignment in [0.0, 0.5, 1.0] {
                let lev = alloc.leverage(strength, alignment, strength);
                assert!((3.0..=10.0).contains(&lev), "leverage {lev} out of range");
            }
        }
    }

    #[test]
    fn stronger_signals_get_more_leverage() {
        let alloc = CapitalAllocator::default();
        let weak = alloc.leverage(0.2, 0.2, 0.2);
        let strong = alloc.leverage(0.95, 0.95, 0.95);
        assert!(strong > weak);
    }

    #[test]
    fn kelly_stays_in_bounds() {
        let alloc = CapitalAllocator::default();
        for p in [0.0, 0.3, 0.5, 0.7, 0.9, 1.0] {
            for phase in [0.0, 0.5, 1.0] {
                let k = alloc.kelly_fraction(p, phase, p);
                assert!((0.1..=1.0).contains(&k), "kelly {k} out of bounds");
            }
        }
    }

    #[test]
    fn kelly_grows_with_win_probability() {
        let alloc = CapitalAllocator::default();
        // fixed phases isolate the Kelly core from the oscillators
        let low = alloc.kelly_fraction(0.5, 0.3, 0.3);
        let high = alloc.kelly_fraction(0.9, 0.3, 0.3);
        assert!(high > low);
    }

    #[test]
    fn allocation_accepted_for_confident_signal() {
        let alloc = CapitalAllocator::default();
        let funds = FundsState::new(1000.0);
        let result = alloc.allocate(&signal(0.8), 0.7, &funds, &breaker_ok());
        assert!(result.accepted, "rejected: {}", result.reason);
        assert!(result.size > 0.0);
        assert!((3.0..=10.0).contains(&result.leverage));
        assert!((0.1..=1.0).contains(&result.kelly_fraction));
        assert!((result.risk_amount - result.size / result.leverage).abs() < 1e-12);
        // notional capped at 2% of available
        assert!(result.size <= 1000.0 * 0.02 + 1e-12);
    }

    #[test]
    fn low_confidence_is_rejected_with_reason() {
        let alloc = CapitalAllocator::default();
        let funds = FundsState::new(1000.0);
        let result = alloc.allocate(&signal(0.3), 0.7, &funds, &breaker_ok());
        assert!(!result.accepted);
        assert!(result.reason.contains("confidence"));
        assert_eq!(result.size, 0.0);
    }

    #[test]
    fn tripped_breaker_rejects_everything() {
        let alloc = CapitalAllocator::default();
        let funds = FundsState::new(1000.0);
        let result = alloc.allocate(&signal(0.9), 0.9, &funds, &breaker_tripped());
        assert!(!result.accepted);
        assert!(result.reason.contains("emergency stop"));
    }

    #[test]
    fn empty_funds_are_rejected() {
        let alloc = CapitalAllocator::default();
        let funds = FundsState::new(0.0);
        let result = alloc.allocate(&signal(0.8), 0.7, &funds, &breaker_ok());
        assert!(!result.accepted);
        assert!(result.reason.contains("insufficient funds"));
    }

    #[test]
    fn allocation_is_deterministic() {
        let alloc = CapitalAllocator::default();
        let funds = FundsState::new(1000.0);
        let a = alloc.allocate(&signal(0.8), 0.7, &funds, &breaker_ok());
        let b = alloc.allocate(&signal(0.8), 0.7, &funds, &breaker_ok());
        assert_eq!(a, b);
    }
}
