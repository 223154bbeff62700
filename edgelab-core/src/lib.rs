//! EdgeLab Core — microstructure edge engine.
//!
//! This crate contains the heart of the trading engine:
//! - Domain types (candles, snapshots, signals, positions, funds)
//! - Feature extraction from candle history (flow, imbalance, funding,
//!   open-interest, stress, impact proxies)
//! - Edge synthesis: z-score weighting plus entropy-based uncertainty
//! - Signal generation with directional-consistency gates
//! - Kelly-style capital allocation with bounded leverage
//! - Position ledger (single writer over funds state)
//! - Risk governor: daily resets and the emergency circuit breaker
//! - Candle providers (REST, CSV, synthetic) behind one trait

pub mod alloc;
pub mod config;
pub mod data;
pub mod domain;
pub mod edge;
pub mod features;
pub mod ledger;
pub mod risk;
pub mod rng;
pub mod signal;
