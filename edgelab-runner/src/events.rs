//! Observer interface for engine events.
//!
//! State changes are returned as values by the core; this trait is the
//! optional push channel on top, decoupling the engine from any particular
//! notification transport. Implementations must be cheap and non-blocking —
//! they run inside the cycle.

use edgelab_core::domain::{MicrostructureSnapshot, Position, Signal};
use edgelab_core::risk::RiskEvent;

pub trait EngineObserver: Send + Sync {
    fn on_snapshot(&self, _snapshot: &MicrostructureSnapshot) {}

    fn on_signal(&self, _symbol: &str, _signal: &Signal) {}

    /// An allocation was refused (low confidence, breaker, funds).
    fn on_rejected(&self, _symbol: &str, _reason: &str) {}

    fn on_position_opened(&self, _position: &Position) {}

    fn on_position_closed(&self, _position: &Position) {}

    /// Risk governor state change (emergency stop, soft reset, rollover).
    fn on_risk_event(&self, _event: &RiskEvent) {}

    /// The cycle produced no snapshot (fetch failure or thin history).
    fn on_cycle_skipped(&self, _symbol: &str, _reason: &str) {}
}

/// Observer that ignores everything.
pub struct NullObserver;

impl EngineObserver for NullObserver {}

/// Observer that prints one line per event to stdout.
pub struct StdoutObserver;

impl EngineObserver for StdoutObserver {
    fn on_signal(&self, symbol: &str, signal: &Signal) {
        println!(
            "[{symbol}] signal {} confidence {:.2} size-factor {:.2}",
            signal.direction, signal.confidence, signal.size_factor
        );
    }

    fn on_rejected(&self, symbol: &str, reason: &str) {
        println!("[{symbol}] allocation rejected: {reason}");
    }

    fn on_position_opened(&self, position: &Position) {
        println!(
            "[{}] opened {} {} notional {:.4} at {:.2} ({}x)",
            position.symbol,
            position.id,
            position.direction,
            position.notional_size,
            position.entry_price,
            position.leverage
        );
    }

    fn on_position_closed(&self, position: &Position) {
        println!(
            "[{}] closed {} at {:.2} pnl {:+.4} ({})",
            position.symbol,
            position.id,
            position.exit_price.unwrap_or(f64::NAN),
            position.realized_pnl.unwrap_or(f64::NAN),
            position
                .close_reason
                .map(|r| r.to_string())
                .unwrap_or_else(|| "unknown".into())
        );
    }

    fn on_risk_event(&self, event: &RiskEvent) {
        match event {
            RiskEvent::EmergencyStopped { reason, .. } => {
                println!("!! EMERGENCY STOP: {reason}");
            }
            RiskEvent::SoftReset { new_daily_start } => {
                println!("-- soft reset, daily baseline {new_daily_start:.2}");
            }
            RiskEvent::DayRollover { date, new_daily_start } => {
                println!("-- day rollover {date}, daily baseline {new_daily_start:.2}");
            }
        }
    }

    fn on_cycle_skipped(&self, symbol: &str, reason: &str) {
        println!("[{symbol}] cycle skipped: {reason}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_observer_accepts_all_defaults() {
        let observer = NullObserver;
        observer.on_rejected("BTCUSDT", "because");
        observer.on_cycle_skipped("BTCUSDT", "no data");
    }

    #[test]
    fn observers_work_as_trait_objects() {
        let observers: Vec<Box<dyn EngineObserver>> =
            vec![Box::new(NullObserver), Box::new(StdoutObserver)];
        for observer in &observers {
            observer.on_cycle_skipped("BTCUSDT", "no data");
        }
    }
}
