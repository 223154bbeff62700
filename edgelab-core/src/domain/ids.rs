//! Position id generation.
//!
//! Ids come from an injected source rather than timestamps or hashes, so
//! tests and replays are deterministic.

use super::position::PositionId;
use std::sync::atomic::{AtomicU64, Ordering};

/// Source of fresh position ids.
pub trait IdSource: Send + Sync {
    fn next_id(&self) -> PositionId;
}

/// Monotonic counter id source. Cheap, deterministic, collision-free within
/// a process lifetime.
#[derive(Debug, Default)]
pub struct MonotonicIds {
    next: AtomicU64,
}

impl MonotonicIds {
    pub fn new() -> Self {
        Self { next: AtomicU64::new(1) }
    }

    /// Start the counter at a specific value (e.g., resuming from history).
    pub fn starting_at(first: u64) -> Self {
        Self { next: AtomicU64::new(first) }
    }
}

impl IdSource for MonotonicIds {
    fn next_id(&self) -> PositionId {
        PositionId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}
