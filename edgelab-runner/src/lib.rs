//! EdgeLab Runner — cycle orchestration over the core engine.
//!
//! Owns the shared mutable state (ledger + risk governor) behind a single
//! logical writer, fans per-symbol cycles across threads, and pushes engine
//! events through the observer interface.

pub mod config;
pub mod engine;
pub mod events;

pub use config::RunnerConfig;
pub use engine::{CycleOutcome, CycleReport, EngineStatus, RunSummary, TradingEngine};
pub use events::{EngineObserver, NullObserver, StdoutObserver};
