//! Position — a booked allocation with bracket prices and lifecycle state.

use super::signal::Direction;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Monotonic position identifier issued by the ledger's id source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PositionId(pub u64);

impl fmt::Display for PositionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Lifecycle: `(none) -> Active -> Closed`. No other transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionStatus {
    Active,
    Closed,
}

/// Why a position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CloseReason {
    StopLoss,
    TakeProfit,
    Manual,
    Emergency,
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloseReason::StopLoss => write!(f, "stop-loss"),
            CloseReason::TakeProfit => write!(f, "take-profit"),
            CloseReason::Manual => write!(f, "manual"),
            CloseReason::Emergency => write!(f, "emergency"),
        }
    }
}

/// A tracked position. Mutated only by the ledger (close); archived into
/// history after closing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub id: PositionId,
    pub symbol: String,
    pub direction: Direction,
    /// Notional exposure (bait x leverage x Kelly x size factor).
    pub notional_size: f64,
    pub leverage: f64,
    /// Capital actually reserved: notional / leverage.
    pub risk_amount: f64,
    pub entry_price: f64,
    pub entry_time: DateTime<Utc>,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub status: PositionStatus,
    pub exit_price: Option<f64>,
    pub exit_time: Option<DateTime<Utc>>,
    pub realized_pnl: Option<f64>,
    pub close_reason: Option<CloseReason>,
}

impl Position {
    /// Signed return of a price move in this position's favor.
    ///
    /// Long: `(price - entry) / entry`. Short: `(entry - price) / entry`.
    pub fn directional_return(&self, price: f64) -> f64 {
        match self.direction {
            Direction::Long => (price - self.entry_price) / self.entry_price,
            Direction::Short => (self.entry_price - price) / self.entry_price,
        }
    }

    /// Unrealized P&L at the given mark price.
    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        self.notional_size * self.directional_return(price)
    }

    pub fn is_active(&self) -> bool {
        self.status == PositionStatus::Active
    }

    /// Whether the given price has crossed the stop level.
    pub fn stop_hit(&self, price: f64) -> bool {
        match self.direction {
            Direction::Long => price <= self.stop_loss,
            Direction::Short => price >= self.stop_loss,
        }
    }

    /// Whether the given price has crossed the profit target.
    pub fn target_hit(&self, price: f64) -> bool {
        match self.direction {
            Direction::Long => price >= self.take_profit,
            Direction::Short => price <= self.take_profit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn make_position(direction: Direction) -> Position {
        Position {
            id: PositionId(1),
            symbol: "BTCUSDT".into(),
            direction,
            notional_size: 50.0,
            leverage: 5.0,
            risk_amount: 10.0,
            entry_price: 100.0,
            entry_time: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            stop_loss: if direction == Direction::Long { 98.0 } else { 102.0 },
            take_profit: if direction == Direction::Long { 106.0 } else { 94.0 },
            status: PositionStatus::Active,
            exit_price: None,
            exit_time: None,
            realized_pnl: None,
            close_reason: None,
        }
    }

    #[test]
    fn long_directional_return() {
        let pos = make_position(Direction::Long);
        assert!((pos.directional_return(110.0) - 0.1).abs() < 1e-12);
        assert!((pos.unrealized_pnl(110.0) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn short_directional_return() {
        let pos = make_position(Direction::Short);
        assert!((pos.directional_return(90.0) - 0.1).abs() < 1e-12);
        assert!((pos.directional_return(110.0) + 0.1).abs() < 1e-12);
    }

    #[test]
    fn long_trigger_checks() {
        let pos = make_position(Direction::Long);
        assert!(pos.stop_hit(97.5));
        assert!(!pos.stop_hit(99.0));
        assert!(pos.target_hit(106.0));
        assert!(!pos.target_hit(105.0));
    }

    #[test]
    fn short_trigger_checks() {
        let pos = make_position(Direction::Short);
        assert!(pos.stop_hit(102.5));
        assert!(!pos.stop_hit(101.0));
        assert!(pos.target_hit(93.0));
        assert!(!pos.target_hit(95.0));
    }
}
