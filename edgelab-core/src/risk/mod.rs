//! Risk governor — drawdown tracking, daily resets, emergency circuit breaker.
//!
//! The governor watches realized closes and halts all new risk-taking once
//! the daily loss breaches the emergency level. A halt is fatal for trading,
//! not for the process: the engine keeps cycling (and may close positions),
//! but every allocation is rejected until an explicit `reset`. A calendar-day
//! rollover always soft-resets the daily baseline.

use crate::config::RiskConfig;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Breaker state, mutated only by the governor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircuitBreakerState {
    pub daily_start_balance: f64,
    pub emergency_stopped: bool,
    pub emergency_reason: Option<String>,
    pub last_reset_date: NaiveDate,
}

/// Per-day performance counters, cleared on every soft reset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyStats {
    pub trades: u32,
    pub wins: u32,
    pub losses: u32,
    pub realized_pnl: f64,
    pub max_drawdown: f64,
}

/// State change reported by the governor. Returned as a value so callers
/// decide how to observe it (log, callback, channel).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RiskEvent {
    EmergencyStopped { reason: String, loss_pct: f64 },
    SoftReset { new_daily_start: f64 },
    DayRollover { date: NaiveDate, new_daily_start: f64 },
}

#[derive(Debug, Clone)]
pub struct RiskGovernor {
    config: RiskConfig,
    state: CircuitBreakerState,
    daily: DailyStats,
}

impl RiskGovernor {
    pub fn new(config: RiskConfig, initial_balance: f64, today: NaiveDate) -> Self {
        Self {
            config,
            state: CircuitBreakerState {
                daily_start_balance: initial_balance,
                emergency_stopped: false,
                emergency_reason: None,
                last_reset_date: today,
            },
            daily: DailyStats::default(),
        }
    }

    pub fn breaker(&self) -> &CircuitBreakerState {
        &self.state
    }

    pub fn daily(&self) -> &DailyStats {
        &self.daily
    }

    pub fn is_halted(&self) -> bool {
        self.state.emergency_stopped
    }

    /// Record a position being opened (daily trade counter).
    pub fn on_open(&mut self) {
        self.daily.trades += 1;
    }

    /// Calendar-day rollover check. Call at the start of every cycle; forces
    /// a soft reset when the date has changed, regardless of loss level.
    pub fn roll_day(&mut self, today: NaiveDate, total_balance: f64) -> Option<RiskEvent> {
        if today == self.state.last_reset_date {
            return None;
        }
        self.soft_reset(total_balance, today);
        Some(RiskEvent::DayRollover {
            date: today,
            new_daily_start: total_balance,
        })
    }

    /// Feed a realized close into the governor.
    ///
    /// Emergency takes precedence over the soft reset: a loss past the
    /// emergency level halts trading and keeps the daily baseline. Once
    /// halted, later closes only update the daily counters — a soft-reset
    /// level loss must not quietly clear a hard trip. The halt survives
    /// until an explicit `reset` or the calendar-day rollover.
    pub fn on_realized_close(
        &mut self,
        pnl: f64,
        total_balance: f64,
        today: NaiveDate,
    ) -> Option<RiskEvent> {
        self.daily.realized_pnl += pnl;
        if pnl >= 0.0 {
            self.daily.wins += 1;
        } else {
            self.daily.losses += 1;
        }

        // a hard stop is sticky: nothing escalates or resets it except an
        // explicit reset or the calendar rollover
        if self.state.emergency_stopped {
            return None;
        }

        let start = self.state.daily_start_balance;
        if start <= 0.0 {
            return None;
        }
        let loss_pct = (start - total_balance) / start;
        self.daily.max_drawdown = self.daily.max_drawdown.max(loss_pct);

        if loss_pct >= self.config.emergency_stop_level {
            let reason = format!(
                "daily loss {:.1}% breached emergency level {:.1}%",
                loss_pct * 100.0,
                self.config.emergency_stop_level * 100.0
            );
            self.state.emergency_stopped = true;
            self.state.emergency_reason = Some(reason.clone());
            Some(RiskEvent::EmergencyStopped { reason, loss_pct })
        } else if loss_pct >= self.config.daily_reset_threshold {
            self.soft_reset(total_balance, today);
            Some(RiskEvent::SoftReset {
                new_daily_start: total_balance,
            })
        } else {
            None
        }
    }

    /// Explicit operator reset: clears the emergency stop and rebases the day.
    pub fn reset(&mut self, total_balance: f64, today: NaiveDate) {
        self.soft_reset(total_balance, today);
    }

    /// Rebase the daily baseline and clear counters and the stop flag.
    ///
    /// Open positions are NOT force-closed here: closing requires an exit
    /// price and goes through the ledger's single-writer path. Callers that
    /// want the harsher behavior close positions themselves on the returned
    /// event.
    fn soft_reset(&mut self, total_balance: f64, today: NaiveDate) {
        self.daily = DailyStats::default();
        self.state.emergency_stopped = false;
        self.state.emergency_reason = None;
        self.state.daily_start_balance = total_balance;
        self.state.last_reset_date = today;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn governor() -> RiskGovernor {
        RiskGovernor::new(RiskConfig::default(), 1000.0, day(1))
    }

    #[test]
    fn loss_past_emergency_level_halts() {
        let mut gov = governor();
        // 10.1% loss: 1000 -> 899
        let event = gov.on_realized_close(-101.0, 899.0, day(1));
        assert!(gov.is_halted());
        assert!(matches!(event, Some(RiskEvent::EmergencyStopped { .. })));
        assert!(gov.breaker().emergency_reason.is_some());
    }

    #[test]
    fn five_percent_loss_soft_resets_without_halt() {
        let mut gov = governor();
        // exactly 5% loss: 1000 -> 950
        let event = gov.on_realized_close(-50.0, 950.0, day(1));
        assert!(!gov.is_halted());
        assert!(matches!(event, Some(RiskEvent::SoftReset { .. })));
        // baseline rebased to the new total
        assert_eq!(gov.breaker().daily_start_balance, 950.0);
    }

    #[test]
    fn small_loss_changes_nothing() {
        let mut gov = governor();
        let event = gov.on_realized_close(-10.0, 990.0, day(1));
        assert!(event.is_none());
        assert!(!gov.is_halted());
        assert_eq!(gov.breaker().daily_start_balance, 1000.0);
    }

    #[test]
    fn emergency_takes_precedence_over_soft_reset() {
        let mut gov = governor();
        gov.on_realized_close(-150.0, 850.0, day(1));
        assert!(gov.is_halted());
        // baseline kept: the halt stays observable
        assert_eq!(gov.breaker().daily_start_balance, 1000.0);
    }

    #[test]
    fn halt_persists_until_explicit_reset() {
        let mut gov = governor();
        gov.on_realized_close(-150.0, 850.0, day(1));
        assert!(gov.is_halted());
        // a later profitable close does not clear the stop
        gov.on_realized_close(100.0, 950.0, day(1));
        assert!(gov.is_halted());
        gov.reset(950.0, day(1));
        assert!(!gov.is_halted());
        assert_eq!(gov.breaker().daily_start_balance, 950.0);
    }

    #[test]
    fn day_rollover_clears_a_hard_stop() {
        let mut gov = governor();
        gov.on_realized_close(-150.0, 850.0, day(1));
        assert!(gov.is_halted());
        gov.roll_day(day(2), 850.0);
        assert!(!gov.is_halted());
        assert_eq!(gov.breaker().daily_start_balance, 850.0);
    }

    #[test]
    fn day_rollover_forces_soft_reset() {
        let mut gov = governor();
        gov.on_realized_close(-30.0, 970.0, day(1));
        let event = gov.roll_day(day(2), 970.0);
        assert!(matches!(event, Some(RiskEvent::DayRollover { .. })));
        assert_eq!(gov.breaker().daily_start_balance, 970.0);
        assert_eq!(gov.breaker().last_reset_date, day(2));
        assert_eq!(gov.daily().trades, 0);
    }

    #[test]
    fn same_day_rollover_is_noop() {
        let mut gov = governor();
        assert!(gov.roll_day(day(1), 1000.0).is_none());
    }

    #[test]
    fn daily_counters_track_wins_and_losses() {
        let mut gov = governor();
        gov.on_open();
        gov.on_realized_close(10.0, 1010.0, day(1));
        gov.on_open();
        gov.on_realized_close(-5.0, 1005.0, day(1));
        assert_eq!(gov.daily().trades, 2);
        assert_eq!(gov.daily().wins, 1);
        assert_eq!(gov.daily().losses, 1);
        assert!((gov.daily().realized_pnl - 5.0).abs() < 1e-12);
    }
}
