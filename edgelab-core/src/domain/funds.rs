//! FundsState — balance triple with the reservation invariant.

use serde::{Deserialize, Serialize};

/// Process-wide fund balances.
///
/// Invariant at every observable instant:
/// `total_balance == available_balance + reserved_balance`, with both parts
/// non-negative. Mutated exclusively by the position ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundsState {
    pub total_balance: f64,
    pub available_balance: f64,
    pub reserved_balance: f64,
}

impl FundsState {
    pub fn new(initial_balance: f64) -> Self {
        Self {
            total_balance: initial_balance,
            available_balance: initial_balance,
            reserved_balance: 0.0,
        }
    }

    /// Checks the accounting identity up to float tolerance.
    pub fn is_consistent(&self) -> bool {
        let drift = self.total_balance - (self.available_balance + self.reserved_balance);
        drift.abs() < 1e-6 && self.available_balance >= -1e-9 && self.reserved_balance >= -1e-9
    }

    /// Move `amount` from available into reserved.
    pub(crate) fn reserve(&mut self, amount: f64) {
        self.available_balance -= amount;
        self.reserved_balance += amount;
    }

    /// Release a reservation and settle its realized P&L: reserved drops by
    /// `amount`, available grows by `amount + pnl`, total moves by `pnl`.
    pub(crate) fn settle(&mut self, amount: f64, pnl: f64) {
        self.reserved_balance -= amount;
        self.available_balance += amount + pnl;
        self.total_balance += pnl;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_funds_are_consistent() {
        let funds = FundsState::new(1000.0);
        assert!(funds.is_consistent());
        assert_eq!(funds.available_balance, 1000.0);
        assert_eq!(funds.reserved_balance, 0.0);
    }

    #[test]
    fn reserve_preserves_total() {
        let mut funds = FundsState::new(1000.0);
        funds.reserve(100.0);
        assert!(funds.is_consistent());
        assert_eq!(funds.total_balance, 1000.0);
        assert_eq!(funds.available_balance, 900.0);
        assert_eq!(funds.reserved_balance, 100.0);
    }

    #[test]
    fn settle_moves_total_by_pnl() {
        let mut funds = FundsState::new(1000.0);
        funds.reserve(100.0);
        funds.settle(100.0, 25.0);
        assert!(funds.is_consistent());
        assert_eq!(funds.total_balance, 1025.0);
        assert_eq!(funds.available_balance, 1025.0);
        assert_eq!(funds.reserved_balance, 0.0);
    }

    #[test]
    fn settle_with_loss() {
        let mut funds = FundsState::new(1000.0);
        funds.reserve(100.0);
        funds.settle(100.0, -40.0);
        assert!(funds.is_consistent());
        assert_eq!(funds.total_balance, 960.0);
        assert_eq!(funds.reserved_balance, 0.0);
    }
}
