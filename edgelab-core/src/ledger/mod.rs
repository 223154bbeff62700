//! Position ledger — the single writer over funds state.
//!
//! All balance mutation happens at the end of `open` and `close`; nothing is
//! mutated incrementally, so a cycle abandoned mid-computation cannot corrupt
//! the books. Misuse (closing an unknown id, opening beyond available funds)
//! is an explicit error to the caller, not a silent no-op.

use crate::alloc::AllocationResult;
use crate::domain::{
    CloseReason, Direction, FundsState, IdSource, MonotonicIds, Position, PositionId,
    PositionStatus,
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// What the caller intends to book: symbol, direction, entry and bracket.
#[derive(Debug, Clone)]
pub struct TradeIntent {
    pub symbol: String,
    pub direction: Direction,
    pub entry_price: f64,
    pub entry_time: DateTime<Utc>,
    pub stop_loss: f64,
    pub take_profit: f64,
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("insufficient funds: required {required:.2}, available {available:.2}")]
    InsufficientFunds { required: f64, available: f64 },

    #[error("position {0} not found or already closed")]
    PositionNotFound(PositionId),
}

/// Aggregate statistics over closed positions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PerformanceSummary {
    pub closed_trades: usize,
    pub wins: usize,
    pub losses: usize,
    pub win_rate: f64,
    pub total_pnl: f64,
}

/// Tracks open/closed positions, fund reservation, and realized P&L.
pub struct PositionLedger {
    funds: FundsState,
    positions: HashMap<PositionId, Position>,
    history: Vec<Position>,
    ids: Arc<dyn IdSource>,
}

impl PositionLedger {
    pub fn new(initial_balance: f64) -> Self {
        Self::with_ids(initial_balance, Arc::new(MonotonicIds::new()))
    }

    pub fn with_ids(initial_balance: f64, ids: Arc<dyn IdSource>) -> Self {
        Self {
            funds: FundsState::new(initial_balance),
            positions: HashMap::new(),
            history: Vec::new(),
            ids,
        }
    }

    /// Read-only copy of the funds state.
    pub fn funds(&self) -> FundsState {
        self.funds.clone()
    }

    /// Book a position from an accepted allocation. Reserves exactly
    /// `risk_amount`.
    pub fn open(
        &mut self,
        intent: TradeIntent,
        alloc: &AllocationResult,
    ) -> Result<Position, LedgerError> {
        if self.funds.available_balance < alloc.risk_amount {
            return Err(LedgerError::InsufficientFunds {
                required: alloc.risk_amount,
                available: self.funds.available_balance,
            });
        }

        let position = Position {
            id: self.ids.next_id(),
            symbol: intent.symbol,
            direction: intent.direction,
            notional_size: alloc.size,
            leverage: alloc.leverage,
            risk_amount: alloc.risk_amount,
            entry_price: intent.entry_price,
            entry_time: intent.entry_time,
            stop_loss: intent.stop_loss,
            take_profit: intent.take_profit,
            status: PositionStatus::Active,
            exit_price: None,
            exit_time: None,
            realized_pnl: None,
            close_reason: None,
        };

        self.funds.reserve(alloc.risk_amount);
        self.positions.insert(position.id, position.clone());
        Ok(position)
    }

    /// Close an active position at `exit_price`. Releases the reservation,
    /// settles realized P&L, and archives the position. A second close on
    /// the same id fails with `PositionNotFound` and changes nothing.
    pub fn close(
        &mut self,
        id: PositionId,
        exit_price: f64,
        exit_time: DateTime<Utc>,
        reason: CloseReason,
    ) -> Result<Position, LedgerError> {
        let mut position = self
            .positions
            .remove(&id)
            .ok_or(LedgerError::PositionNotFound(id))?;

        let pnl = position.notional_size * position.directional_return(exit_price);
        self.funds.settle(position.risk_amount, pnl);

        position.status = PositionStatus::Closed;
        position.exit_price = Some(exit_price);
        position.exit_time = Some(exit_time);
        position.realized_pnl = Some(pnl);
        position.close_reason = Some(reason);

        self.history.push(position.clone());
        Ok(position)
    }

    /// Active positions of a symbol whose stop or target the price has
    /// crossed, with the corresponding close reason. Pure query: the caller
    /// decides whether to close them.
    pub fn triggered_exits(&self, symbol: &str, price: f64) -> Vec<(PositionId, CloseReason)> {
        let mut triggered: Vec<(PositionId, CloseReason)> = self
            .positions
            .values()
            .filter(|p| p.symbol == symbol)
            .filter_map(|p| {
                if p.target_hit(price) {
                    Some((p.id, CloseReason::TakeProfit))
                } else if p.stop_hit(price) {
                    Some((p.id, CloseReason::StopLoss))
                } else {
                    None
                }
            })
            .collect();
        triggered.sort_by_key(|(id, _)| *id);
        triggered
    }

    pub fn active_positions(&self) -> Vec<&Position> {
        let mut positions: Vec<&Position> = self.positions.values().collect();
        positions.sort_by_key(|p| p.id);
        positions
    }

    pub fn active_count(&self) -> usize {
        self.positions.len()
    }

    pub fn has_active(&self, symbol: &str) -> bool {
        self.positions.values().any(|p| p.symbol == symbol)
    }

    pub fn history(&self) -> &[Position] {
        &self.history
    }

    /// Win/loss statistics over the archived history.
    pub fn performance(&self) -> PerformanceSummary {
        let closed_trades = self.history.len();
        let mut wins = 0;
        let mut losses = 0;
        let mut total_pnl = 0.0;
        for p in &self.history {
            let pnl = p.realized_pnl.unwrap_or(0.0);
            total_pnl += pnl;
            if pnl >= 0.0 {
                wins += 1;
            } else {
                losses += 1;
            }
        }
        PerformanceSummary {
            closed_trades,
            wins,
            losses,
            win_rate: if closed_trades > 0 {
                wins as f64 / closed_trades as f64
            } else {
                0.0
            },
            total_pnl,
        }
    }
}
