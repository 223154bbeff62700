//! The trading engine: periodic per-symbol cycles over a shared ledger.
//!
//! Each cycle is: roll the risk day, close any positions whose bracket the
//! price has crossed, fetch candles, build a snapshot, evaluate the signal,
//! allocate, and book the position. Feature extraction and signal evaluation
//! are pure, so cycles for different symbols run in parallel; the ledger and
//! governor sit behind mutexes as the single logical writer. A failed fetch
//! or thin history skips the cycle — no retry storm, no partial snapshot.

use crate::config::RunnerConfig;
use crate::events::EngineObserver;
use chrono::Utc;
use edgelab_core::alloc::CapitalAllocator;
use edgelab_core::data::{CandleInterval, CandleProvider};
use edgelab_core::domain::{CloseReason, FundsState, Position, PositionId};
use edgelab_core::edge::EdgeSynthesizer;
use edgelab_core::features::FeatureExtractor;
use edgelab_core::ledger::{LedgerError, PerformanceSummary, PositionLedger, TradeIntent};
use edgelab_core::risk::{CircuitBreakerState, DailyStats, RiskEvent, RiskGovernor};
use edgelab_core::signal::SignalGenerator;
use rayon::prelude::*;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info, warn};

/// What a single per-symbol cycle produced.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// No snapshot this cycle: fetch failed or history too thin.
    Skipped { reason: String },
    /// Snapshot built, but the gates emitted no signal.
    NoSignal,
    /// The symbol already holds an active position; no new entry evaluated.
    Holding,
    /// Signal emitted, allocation refused.
    Rejected { reason: String },
    /// Position booked.
    Opened { position_id: PositionId },
}

#[derive(Debug, Clone)]
pub struct CycleReport {
    pub symbol: String,
    /// Positions closed by bracket triggers at the start of the cycle.
    pub closed: Vec<PositionId>,
    pub outcome: CycleOutcome,
}

/// Read-only status snapshot, queryable at any time.
#[derive(Debug, Clone)]
pub struct EngineStatus {
    pub funds: FundsState,
    pub breaker: CircuitBreakerState,
    pub daily: DailyStats,
    pub active_positions: usize,
    pub performance: PerformanceSummary,
}

/// Totals over a multi-cycle run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub cycles: usize,
    pub opened: usize,
    pub closed: usize,
    pub rejected: usize,
    pub skipped: usize,
}

pub struct TradingEngine {
    symbols: Vec<String>,
    interval: CandleInterval,
    candle_limit: usize,
    provider: Arc<dyn CandleProvider>,
    extractor: FeatureExtractor,
    synthesizer: EdgeSynthesizer,
    generator: SignalGenerator,
    allocator: CapitalAllocator,
    ledger: Mutex<PositionLedger>,
    governor: Mutex<RiskGovernor>,
    observer: Arc<dyn EngineObserver>,
}

impl TradingEngine {
    pub fn new(
        config: RunnerConfig,
        provider: Arc<dyn CandleProvider>,
        observer: Arc<dyn EngineObserver>,
    ) -> Self {
        let today = Utc::now().date_naive();
        Self {
            symbols: config.symbols,
            interval: config.interval,
            candle_limit: config.candle_limit,
            provider,
            extractor: FeatureExtractor::new(config.engine.features),
            synthesizer: EdgeSynthesizer::new(config.engine.edge),
            generator: SignalGenerator::new(config.engine.signal),
            allocator: CapitalAllocator::new(config.engine.alloc),
            ledger: Mutex::new(PositionLedger::new(config.initial_balance)),
            governor: Mutex::new(RiskGovernor::new(
                config.engine.risk,
                config.initial_balance,
                today,
            )),
            observer,
        }
    }

    /// One cycle for one symbol.
    pub fn run_cycle(&self, symbol: &str) -> CycleReport {
        let today = Utc::now().date_naive();

        // calendar rollover first, so a new day always starts from a clean baseline
        let total = self.lock_ledger().funds().total_balance;
        if let Some(event) = self.lock_governor().roll_day(today, total) {
            info!(%symbol, ?event, "risk day rolled over");
            self.observer.on_risk_event(&event);
        }

        let candles = match self.provider.fetch(symbol, self.interval, self.candle_limit) {
            Ok(candles) => candles,
            Err(e) => {
                warn!(%symbol, error = %e, "candle fetch failed, skipping cycle");
                let reason = e.to_string();
                self.observer.on_cycle_skipped(symbol, &reason);
                return CycleReport {
                    symbol: symbol.to_string(),
                    closed: Vec::new(),
                    outcome: CycleOutcome::Skipped { reason },
                };
            }
        };

        let closed = match candles.last() {
            Some(last) => self.close_triggered(symbol, last.close),
            None => Vec::new(),
        };

        // one position per symbol: while one is open, only its bracket matters
        let outcome = if self.lock_ledger().has_active(symbol) {
            CycleOutcome::Holding
        } else {
            self.evaluate_and_allocate(symbol, &candles)
        };
        CycleReport {
            symbol: symbol.to_string(),
            closed,
            outcome,
        }
    }

    /// One cycle for every configured symbol, fanned out across threads.
    pub fn run_cycle_all(&self) -> Vec<CycleReport> {
        self.symbols
            .par_iter()
            .map(|symbol| self.run_cycle(symbol))
            .collect()
    }

    /// Run `cycles` full passes with an optional pause between them.
    pub fn run_for(&self, cycles: usize, pause: Option<Duration>) -> RunSummary {
        let mut summary = RunSummary::default();
        for i in 0..cycles {
            let reports = self.run_cycle_all();
            summary.cycles += 1;
            for report in &reports {
                summary.closed += report.closed.len();
                match &report.outcome {
                    CycleOutcome::Opened { .. } => summary.opened += 1,
                    CycleOutcome::Rejected { .. } => summary.rejected += 1,
                    CycleOutcome::Skipped { .. } => summary.skipped += 1,
                    CycleOutcome::NoSignal | CycleOutcome::Holding => {}
                }
            }
            debug!(cycle = i, opened = summary.opened, closed = summary.closed, "cycle complete");
            if let Some(pause) = pause {
                if i + 1 < cycles {
                    std::thread::sleep(pause);
                }
            }
        }
        summary
    }

    /// Close an active position at an explicit price, feeding the governor.
    pub fn close_position(
        &self,
        id: PositionId,
        exit_price: f64,
        reason: CloseReason,
    ) -> Result<Position, LedgerError> {
        let closed = self
            .lock_ledger()
            .close(id, exit_price, Utc::now(), reason)?;
        self.observer.on_position_closed(&closed);
        self.govern_realized(&closed);
        Ok(closed)
    }

    /// Clear the emergency stop and rebase the risk day.
    pub fn reset_breaker(&self) {
        let total = self.lock_ledger().funds().total_balance;
        self.lock_governor().reset(total, Utc::now().date_naive());
        info!(total, "emergency stop cleared");
    }

    pub fn status(&self) -> EngineStatus {
        let ledger = self.lock_ledger();
        let governor = self.lock_governor();
        EngineStatus {
            funds: ledger.funds(),
            breaker: governor.breaker().clone(),
            daily: governor.daily().clone(),
            active_positions: ledger.active_count(),
            performance: ledger.performance(),
        }
    }

    // ── internals ────────────────────────────────────────────────────

    fn close_triggered(&self, symbol: &str, price: f64) -> Vec<PositionId> {
        let hits = self.lock_ledger().triggered_exits(symbol, price);
        let mut closed_ids = Vec::with_capacity(hits.len());
        for (id, reason) in hits {
            match self.lock_ledger().close(id, price, Utc::now(), reason) {
                Ok(closed) => {
                    info!(
                        %symbol,
                        position = %id,
                        pnl = closed.realized_pnl.unwrap_or(0.0),
                        %reason,
                        "bracket exit"
                    );
                    self.observer.on_position_closed(&closed);
                    self.govern_realized(&closed);
                    closed_ids.push(id);
                }
                Err(e) => {
                    // another cycle may have closed it between query and call
                    debug!(%symbol, position = %id, error = %e, "trigger close lost the race");
                }
            }
        }
        closed_ids
    }

    fn govern_realized(&self, closed: &Position) {
        let pnl = closed.realized_pnl.unwrap_or(0.0);
        let total = self.lock_ledger().funds().total_balance;
        let event = self
            .lock_governor()
            .on_realized_close(pnl, total, Utc::now().date_naive());
        if let Some(event) = event {
            if let RiskEvent::EmergencyStopped { reason, .. } = &event {
                warn!(%reason, "emergency stop tripped");
            }
            self.observer.on_risk_event(&event);
        }
    }

    fn evaluate_and_allocate(
        &self,
        symbol: &str,
        candles: &[edgelab_core::domain::Candle],
    ) -> CycleOutcome {
        let Some(features) = self.extractor.extract(candles) else {
            let reason = format!(
                "insufficient data: {} candles, need {}",
                candles.len(),
                self.extractor.min_candles()
            );
            debug!(%symbol, %reason, "no snapshot this cycle");
            self.observer.on_cycle_skipped(symbol, &reason);
            return CycleOutcome::Skipped { reason };
        };

        let snapshot = self.synthesizer.synthesize(symbol, Utc::now(), features);
        self.observer.on_snapshot(&snapshot);

        let Some(signal) = self.generator.evaluate(&snapshot) else {
            return CycleOutcome::NoSignal;
        };
        info!(%symbol, direction = %signal.direction, confidence = signal.confidence, "signal");
        self.observer.on_signal(symbol, &signal);

        let alignment = 1.0 - snapshot.entropy;
        let (funds, breaker) = {
            let ledger = self.lock_ledger();
            let governor = self.lock_governor();
            (ledger.funds(), governor.breaker().clone())
        };
        let allocation = self.allocator.allocate(&signal, alignment, &funds, &breaker);
        if !allocation.accepted {
            debug!(%symbol, reason = %allocation.reason, "allocation rejected");
            self.observer.on_rejected(symbol, &allocation.reason);
            return CycleOutcome::Rejected { reason: allocation.reason };
        }

        let entry_price = candles.last().map(|c| c.close).unwrap_or(0.0);
        let bracket = self.allocator.bracket(
            entry_price,
            signal.direction,
            signal.confidence,
            allocation.leverage,
        );
        let intent = TradeIntent {
            symbol: symbol.to_string(),
            direction: signal.direction,
            entry_price,
            entry_time: Utc::now(),
            stop_loss: bracket.stop_loss,
            take_profit: bracket.take_profit,
        };

        match self.lock_ledger().open(intent, &allocation) {
            Ok(position) => {
                self.lock_governor().on_open();
                info!(
                    %symbol,
                    position = %position.id,
                    size = position.notional_size,
                    leverage = position.leverage,
                    "position opened"
                );
                self.observer.on_position_opened(&position);
                CycleOutcome::Opened { position_id: position.id }
            }
            // funds moved between the allocation check and the booking
            Err(e) => {
                let reason = e.to_string();
                warn!(%symbol, %reason, "open failed after allocation");
                self.observer.on_rejected(symbol, &reason);
                CycleOutcome::Rejected { reason }
            }
        }
    }

    fn lock_ledger(&self) -> std::sync::MutexGuard<'_, PositionLedger> {
        self.ledger.lock().expect("ledger lock poisoned")
    }

    fn lock_governor(&self) -> std::sync::MutexGuard<'_, RiskGovernor> {
        self.governor.lock().expect("governor lock poisoned")
    }
}
