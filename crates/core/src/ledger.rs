//! Pity ledger state machine.
//!
//! The ledger is pure: it never performs I/O. Persistence and prompting are
//! driven by the caller, which is what lets the limited pool's 50/50 be a
//! real suspension point. A trigger that needs an answer hands out a
//! [`TieBreakTicket`] and leaves `won_tiebreak` / `guaranteed` untouched
//! until [`PityLedger::resolve_tie_break`] is called with that ticket.

use serde::Serialize;

use crate::error::CoreError;
use crate::notification::Notification;
use crate::pool::{PoolKind, MAX_FATE_POINTS};
use crate::state::{LedgerSnapshot, LimitedState};
use crate::types::UserId;
use crate::view::PoolView;

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Proof of an outstanding 50/50. Not `Clone`, so one answer per request.
#[derive(Debug, PartialEq, Eq)]
pub struct TieBreakTicket {
    id: u64,
    pool: PoolKind,
}

impl TieBreakTicket {
    pub fn pool(&self) -> PoolKind {
        self.pool
    }
}

/// What a completed trigger did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "pool")]
pub enum TriggerOutcome {
    Limited {
        won: bool,
        /// The win came from a guarantee; no 50/50 was asked.
        via_guarantee: bool,
    },
    Weapon {
        fate_points: u8,
    },
    Standard,
}

impl TriggerOutcome {
    pub fn pool(&self) -> PoolKind {
        match self {
            TriggerOutcome::Limited { .. } => PoolKind::Limited,
            TriggerOutcome::Weapon { .. } => PoolKind::Weapon,
            TriggerOutcome::Standard => PoolKind::Standard,
        }
    }

    /// Limited triggers always announce their result, guaranteed wins included.
    pub fn notification(&self) -> Option<Notification> {
        match self {
            TriggerOutcome::Limited { won, .. } => Some(Notification::tie_break(*won)),
            _ => None,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum PullOutcome {
    /// Pity advanced without reaching the threshold.
    Counted { pity: u32 },
    Triggered(TriggerOutcome),
    /// The 50/50 must be answered before the trigger can complete.
    AwaitingTieBreak(TieBreakTicket),
}

#[derive(Debug)]
struct PendingTieBreak {
    ticket: u64,
    pool: PoolKind,
    /// Limited state before the operation that raised the request.
    before: LimitedState,
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct PityLedger {
    user: UserId,
    state: LedgerSnapshot,
    pending: Option<PendingTieBreak>,
    next_ticket: u64,
}

impl PityLedger {
    /// A fresh ledger with every pool zeroed.
    pub fn new(user: UserId) -> Self {
        Self::from_snapshot(user, LedgerSnapshot::default())
    }

    /// Out-of-range values are clamped first; see [`LedgerSnapshot::normalized`].
    pub fn from_snapshot(user: UserId, state: LedgerSnapshot) -> Self {
        let (state, _) = state.normalized();
        Self {
            user,
            state,
            pending: None,
            next_ticket: 0,
        }
    }

    pub fn user(&self) -> &UserId {
        &self.user
    }

    pub fn snapshot(&self) -> &LedgerSnapshot {
        &self.state
    }

    pub fn view(&self, pool: PoolKind) -> PoolView {
        PoolView::of(&self.state, pool)
    }

    /// Pool whose 50/50 is awaiting an answer, if any.
    pub fn pending_tie_break(&self) -> Option<PoolKind> {
        self.pending.as_ref().map(|p| p.pool)
    }

    /// Record one pull, running the trigger when the threshold is reached.
    pub fn pull(&mut self, pool: PoolKind) -> Result<PullOutcome, CoreError> {
        self.ensure_idle()?;
        let before = self.state.limited;
        let pity = self.state.pity_mut(pool);
        *pity += 1;
        if *pity < pool.threshold() {
            return Ok(PullOutcome::Counted { pity: *pity });
        }
        Ok(self.trigger(pool, before))
    }

    /// Undo one pull. Returns `false` when pity was already 0.
    pub fn remove_pull(&mut self, pool: PoolKind) -> Result<bool, CoreError> {
        self.ensure_idle()?;
        let pity = self.state.pity_mut(pool);
        if *pity == 0 {
            return Ok(false);
        }
        *pity -= 1;
        Ok(true)
    }

    /// Record a 5★ that arrived before the threshold.
    pub fn force_early_trigger(&mut self, pool: PoolKind) -> Result<PullOutcome, CoreError> {
        self.ensure_idle()?;
        let before = self.state.limited;
        Ok(self.trigger(pool, before))
    }

    /// Complete the limited trigger with the user's 50/50 answer.
    pub fn resolve_tie_break(
        &mut self,
        ticket: TieBreakTicket,
        won: bool,
    ) -> Result<TriggerOutcome, CoreError> {
        self.take_pending(&ticket)?;
        Ok(self.complete_limited(won, false))
    }

    /// Drop an unanswered 50/50 and restore the limited pool to its state
    /// before the request was raised.
    pub fn abandon_tie_break(&mut self, ticket: TieBreakTicket) -> Result<(), CoreError> {
        let pending = self.take_pending(&ticket)?;
        self.state.limited = pending.before;
        Ok(())
    }

    fn ensure_idle(&self) -> Result<(), CoreError> {
        match &self.pending {
            Some(p) => Err(CoreError::TieBreakPending { pool: p.pool }),
            None => Ok(()),
        }
    }

    fn take_pending(&mut self, ticket: &TieBreakTicket) -> Result<PendingTieBreak, CoreError> {
        match self.pending.take() {
            Some(p) if p.ticket == ticket.id => Ok(p),
            other => {
                self.pending = other;
                Err(CoreError::NoPendingTieBreak)
            }
        }
    }

    fn trigger(&mut self, pool: PoolKind, before: LimitedState) -> PullOutcome {
        match pool {
            PoolKind::Limited if self.state.limited.guaranteed => {
                PullOutcome::Triggered(self.complete_limited(true, true))
            }
            PoolKind::Limited => {
                let id = self.next_ticket;
                self.next_ticket += 1;
                self.pending = Some(PendingTieBreak {
                    ticket: id,
                    pool,
                    before,
                });
                PullOutcome::AwaitingTieBreak(TieBreakTicket { id, pool })
            }
            PoolKind::Weapon => {
                let weapon = &mut self.state.weapon;
                weapon.pity = 0;
                weapon.fate_points = weapon.fate_points.saturating_add(1).min(MAX_FATE_POINTS);
                PullOutcome::Triggered(TriggerOutcome::Weapon {
                    fate_points: weapon.fate_points,
                })
            }
            PoolKind::Standard => {
                self.state.standard.pity = 0;
                PullOutcome::Triggered(TriggerOutcome::Standard)
            }
        }
    }

    fn complete_limited(&mut self, won: bool, via_guarantee: bool) -> TriggerOutcome {
        let limited = &mut self.state.limited;
        limited.won_tiebreak = won;
        limited.guaranteed = !won;
        limited.pity = 0;
        TriggerOutcome::Limited { won, via_guarantee }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
