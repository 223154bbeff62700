//! Domain types: candles, snapshots, signals, positions, funds, ids.

pub mod candle;
pub mod funds;
pub mod ids;
pub mod position;
pub mod signal;
pub mod snapshot;

pub use candle::Candle;
pub use funds::FundsState;
pub use ids::{IdSource, MonotonicIds};
pub use position::{CloseReason, Position, PositionId, PositionStatus};
pub use signal::{Direction, Signal};
pub use snapshot::{FeatureVector, MicrostructureSnapshot};
