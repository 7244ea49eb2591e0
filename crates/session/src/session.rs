//! Write-through ledger session.
//!
//! Every completed command is saved before its `StateChanged` event goes
//! out. A limited trigger that needs a 50/50 answer awaits the prompt
//! first and saves only once the full outcome is known, so the persisted
//! file never holds a half-applied trigger.

use std::sync::Arc;

use wishtrack_core::{
    CoreError, Notification, PityLedger, PoolKind, PoolView, PullOutcome, TieBreakTicket,
    TriggerOutcome, UserId,
};
use wishtrack_events::{EventBus, LedgerEvent};
use wishtrack_store::{SnapshotStore, StoreError};

use crate::error::{SessionError, SessionResult};
use crate::prompt::TieBreakPrompt;

/// What a single command did to one pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandReport {
    pub pool: PoolKind,
    /// Pulls applied (0 for removals and early triggers).
    pub pulls: u32,
    /// Triggers completed, in order.
    pub triggers: Vec<TriggerOutcome>,
    /// Pity after the command.
    pub pity: u32,
}

impl CommandReport {
    fn new(pool: PoolKind) -> Self {
        Self {
            pool,
            pulls: 0,
            triggers: Vec::new(),
            pity: 0,
        }
    }
}

pub struct LedgerSession<S, P> {
    ledger: PityLedger,
    store: S,
    prompt: P,
    bus: Arc<EventBus>,
}

impl<S, P> LedgerSession<S, P>
where
    S: SnapshotStore,
    P: TieBreakPrompt,
{
    /// Load the user's ledger, or start a zeroed one if nothing is saved.
    pub fn open(user: UserId, store: S, prompt: P, bus: Arc<EventBus>) -> SessionResult<Self> {
        let ledger = match store.load(&user)? {
            Some(snapshot) => {
                let (snapshot, repaired) = snapshot.normalized();
                if repaired {
                    tracing::warn!(user = %user, "Saved wish data was out of range and has been clamped");
                }
                tracing::info!(user = %user, "Loaded pity ledger");
                PityLedger::from_snapshot(user, snapshot)
            }
            None => {
                tracing::info!(user = %user, "No saved wish data, starting a fresh ledger");
                PityLedger::new(user)
            }
        };

        Ok(Self {
            ledger,
            store,
            prompt,
            bus,
        })
    }

    pub fn ledger(&self) -> &PityLedger {
        &self.ledger
    }

    pub fn user(&self) -> &UserId {
        self.ledger.user()
    }

    pub fn view(&self, pool: PoolKind) -> PoolView {
        self.ledger.view(pool)
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    /// One pull.
    pub async fn pull(&mut self, pool: PoolKind) -> SessionResult<CommandReport> {
        let mut report = CommandReport::new(pool);
        self.pull_once(pool, &mut report).await?;
        Ok(self.seal(report))
    }

    /// `count` sequential pulls, each with its full trigger logic.
    ///
    /// A failed save does not stop the remaining pulls; the last save error
    /// is returned once all of them ran. A closed prompt stops immediately.
    pub async fn bulk_pull(&mut self, pool: PoolKind, count: u32) -> SessionResult<CommandReport> {
        let mut report = CommandReport::new(pool);
        let mut save_error: Option<StoreError> = None;

        for _ in 0..count {
            match self.pull_once(pool, &mut report).await {
                Ok(()) => {}
                Err(SessionError::PersistenceUnavailable(e)) => save_error = Some(e),
                Err(other) => return Err(other),
            }
        }

        match save_error {
            Some(e) => Err(e.into()),
            None => Ok(self.seal(report)),
        }
    }

    /// Undo one pull. Saves even when pity was already 0.
    pub fn remove_pull(&mut self, pool: PoolKind) -> SessionResult<CommandReport> {
        let removed = self.ledger.remove_pull(pool)?;
        tracing::debug!(
            user = %self.ledger.user(),
            pool = %pool,
            removed,
            pity = self.ledger.snapshot().pity(pool),
            "Removed pull"
        );
        self.persist(pool)?;
        Ok(self.seal(CommandReport::new(pool)))
    }

    /// Record a 5★ that arrived before the threshold.
    pub async fn force_early_trigger(&mut self, pool: PoolKind) -> SessionResult<CommandReport> {
        let mut report = CommandReport::new(pool);
        let outcome = self.ledger.force_early_trigger(pool)?;
        self.complete(pool, outcome, &mut report).await?;
        Ok(self.seal(report))
    }

    async fn pull_once(&mut self, pool: PoolKind, report: &mut CommandReport) -> SessionResult<()> {
        let outcome = self.ledger.pull(pool)?;
        report.pulls += 1;
        self.complete(pool, outcome, report).await
    }

    async fn complete(
        &mut self,
        pool: PoolKind,
        outcome: PullOutcome,
        report: &mut CommandReport,
    ) -> SessionResult<()> {
        let trigger = match outcome {
            PullOutcome::Counted { pity } => {
                tracing::debug!(user = %self.ledger.user(), pool = %pool, pity, "Pull counted");
                None
            }
            PullOutcome::Triggered(trigger) => Some(trigger),
            PullOutcome::AwaitingTieBreak(ticket) => Some(self.await_tie_break(ticket).await?),
        };

        if let Some(trigger) = trigger {
            tracing::info!(user = %self.ledger.user(), pool = %pool, ?trigger, "5★ trigger");
            report.triggers.push(trigger);
        }

        let saved = self.persist(pool);
        if let Some(notification) = trigger.and_then(|t| t.notification()) {
            self.notify(notification);
        }
        saved
    }

    async fn await_tie_break(&mut self, ticket: TieBreakTicket) -> SessionResult<TriggerOutcome> {
        let pool = ticket.pool();
        tracing::info!(user = %self.ledger.user(), pool = %pool, "Awaiting 50/50 answer");

        // Abandons the trigger if this future is dropped before the answer lands.
        let pending = PendingAnswer {
            ledger: &mut self.ledger,
            ticket: Some(ticket),
        };

        match self.prompt.request_tie_break(pool).await {
            Ok(won) => {
                tracing::info!(user = %pending.ledger.user(), pool = %pool, won, "50/50 answered");
                Ok(pending.resolve(won)?)
            }
            Err(e) => {
                tracing::debug!(pool = %pool, error = %e, "50/50 prompt failed");
                drop(pending);
                Err(SessionError::PromptClosed)
            }
        }
    }

    /// Save, then publish the new state whether or not the save worked.
    fn persist(&mut self, pool: PoolKind) -> SessionResult<()> {
        let result = self.store.save(self.ledger.user(), self.ledger.snapshot());

        self.bus.publish(LedgerEvent::state_changed(
            self.ledger.user().clone(),
            self.ledger.view(pool),
        ));

        if let Err(e) = &result {
            tracing::warn!(user = %self.ledger.user(), pool = %pool, error = %e, "Failed to save wish data");
            self.notify(Notification::persistence_failed(e));
        }
        result.map_err(SessionError::from)
    }

    fn notify(&self, notification: Notification) {
        self.bus
            .publish(LedgerEvent::notification(self.ledger.user().clone(), notification));
    }

    fn seal(&self, mut report: CommandReport) -> CommandReport {
        report.pity = self.ledger.snapshot().pity(report.pool);
        report
    }
}

/// An outstanding 50/50 ticket. Dropping it unresolved restores the limited
/// pool to its pre-trigger state.
struct PendingAnswer<'a> {
    ledger: &'a mut PityLedger,
    ticket: Option<TieBreakTicket>,
}

impl PendingAnswer<'_> {
    fn resolve(mut self, won: bool) -> Result<TriggerOutcome, CoreError> {
        match self.ticket.take() {
            Some(ticket) => self.ledger.resolve_tie_break(ticket, won),
            None => Err(CoreError::NoPendingTieBreak),
        }
    }
}

impl Drop for PendingAnswer<'_> {
    fn drop(&mut self) {
        if let Some(ticket) = self.ticket.take() {
            let pool = ticket.pool();
            match self.ledger.abandon_tie_break(ticket) {
                Ok(()) => tracing::warn!(
                    user = %self.ledger.user(),
                    pool = %pool,
                    "50/50 left unanswered, trigger abandoned"
                ),
                Err(e) => tracing::error!(pool = %pool, error = %e, "Failed to abandon 50/50"),
            }
        }
    }
}
