//! Signal — directional intent with confidence and sizing damping.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Trade direction. Shared by signals and positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// Sign of a favorable price move: +1 for long, -1 for short.
    pub fn sign(&self) -> f64 {
        match self {
            Direction::Long => 1.0,
            Direction::Short => -1.0,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Long => write!(f, "LONG"),
            Direction::Short => write!(f, "SHORT"),
        }
    }
}

/// A directional signal derived from a single snapshot. Stateless: carries
/// everything downstream sizing needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub direction: Direction,
    /// Conviction in [0, 1].
    pub confidence: f64,
    /// Position-size damping factor in [0.15, 1].
    pub size_factor: f64,
    /// Compact human-readable summary of the deciding features.
    pub rationale: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_signs() {
        assert_eq!(Direction::Long.sign(), 1.0);
        assert_eq!(Direction::Short.sign(), -1.0);
    }

    #[test]
    fn direction_display() {
        assert_eq!(Direction::Long.to_string(), "LONG");
        assert_eq!(Direction::Short.to_string(), "SHORT");
    }

    #[test]
    fn signal_serialization_roundtrip() {
        let signal = Signal {
            direction: Direction::Short,
            confidence: 0.72,
            size_factor: 0.9,
            rationale: "IB:-0.41 OFI:-0.03 EDGE:-0.21".into(),
        };
        let json = serde_json::to_string(&signal).unwrap();
        let deser: Signal = serde_json::from_str(&json).unwrap();
        assert_eq!(deser.direction, Direction::Short);
        assert_eq!(deser.confidence, 0.72);
    }
}
