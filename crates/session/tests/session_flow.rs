//! End-to-end tests for `LedgerSession` over an in-memory store.
//!
//! These drive the session the way a front-end does and check the three
//! observable effects of each command: ledger state, saves, and events.

use std::sync::Arc;

use assert_matches::assert_matches;
use tokio::sync::broadcast;
use wishtrack_core::notification::{LOST_TIEBREAK_MESSAGE, WON_TIEBREAK_MESSAGE};
use wishtrack_core::state::LimitedState;
use wishtrack_core::{LedgerSnapshot, PoolKind, TriggerOutcome, UserId};
use wishtrack_events::{EventBus, LedgerEvent, LedgerEventKind};
use wishtrack_session::{
    ChannelPrompt, LedgerSession, ScriptedPrompt, SessionError, TieBreakRequest,
};
use wishtrack_store::{MemoryStore, SnapshotStore};

type ScriptedSession = LedgerSession<Arc<MemoryStore>, Arc<ScriptedPrompt>>;

struct Harness {
    session: ScriptedSession,
    store: Arc<MemoryStore>,
    prompt: Arc<ScriptedPrompt>,
    events: broadcast::Receiver<LedgerEvent>,
}

fn user() -> UserId {
    UserId::default()
}

fn harness(answers: impl IntoIterator<Item = bool>) -> Harness {
    harness_with(LedgerSnapshot::default(), answers)
}

fn harness_with(seed: LedgerSnapshot, answers: impl IntoIterator<Item = bool>) -> Harness {
    let store = Arc::new(MemoryStore::new());
    if seed != LedgerSnapshot::default() {
        store.insert(&user(), seed);
    }
    let prompt = Arc::new(ScriptedPrompt::new(answers));
    let bus = Arc::new(EventBus::new(4096));
    let events = bus.subscribe();
    let session =
        LedgerSession::open(user(), Arc::clone(&store), Arc::clone(&prompt), bus).unwrap();
    Harness {
        session,
        store,
        prompt,
        events,
    }
}

async fn pull_times(session: &mut ScriptedSession, pool: PoolKind, n: u32) {
    for _ in 0..n {
        session.pull(pool).await.unwrap();
    }
}

fn drain(events: &mut broadcast::Receiver<LedgerEvent>) -> Vec<LedgerEventKind> {
    let mut kinds = Vec::new();
    while let Ok(event) = events.try_recv() {
        kinds.push(event.kind);
    }
    kinds
}

fn notifications(kinds: &[LedgerEventKind]) -> Vec<String> {
    kinds
        .iter()
        .filter_map(|k| match k {
            LedgerEventKind::Notification { message, .. } => Some(message.clone()),
            _ => None,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Test: opening with no saved data starts zeroed, with saved data loads it
// ---------------------------------------------------------------------------

#[tokio::test]
async fn open_starts_fresh_or_loads_saved() {
    let h = harness([]);
    assert_eq!(*h.session.ledger().snapshot(), LedgerSnapshot::default());
    assert_eq!(h.store.save_count(&user()), 0);

    let mut seed = LedgerSnapshot::default();
    seed.limited.pity = 40;
    seed.limited.guaranteed = true;
    let h = harness_with(seed, []);
    assert_eq!(*h.session.ledger().snapshot(), seed);
}

#[tokio::test]
async fn open_clamps_out_of_range_snapshot() {
    let mut seed = LedgerSnapshot::default();
    seed.weapon.fate_points = 9;
    seed.standard.pity = 91;
    let h = harness_with(seed, []);

    assert_eq!(h.session.ledger().snapshot().weapon.fate_points, 2);
    assert_eq!(h.session.ledger().snapshot().standard.pity, 0);
}

// ---------------------------------------------------------------------------
// Test: every counted pull saves and publishes the new state
// ---------------------------------------------------------------------------

#[tokio::test]
async fn pull_saves_then_publishes_state() {
    let mut h = harness([]);

    let report = h.session.pull(PoolKind::Standard).await.unwrap();

    assert_eq!(report.pulls, 1);
    assert_eq!(report.pity, 1);
    assert!(report.triggers.is_empty());
    assert_eq!(h.store.save_count(&user()), 1);
    assert_eq!(h.store.stored(&user()).unwrap().standard.pity, 1);
    let kinds = drain(&mut h.events);
    assert_matches!(
        kinds.as_slice(),
        [LedgerEventKind::StateChanged { pool: PoolKind::Standard, view }] if view.pity == 1
    );
}

// ---------------------------------------------------------------------------
// Test: limited pool through a lost 50/50 and the guaranteed win
// ---------------------------------------------------------------------------

#[tokio::test]
async fn limited_loss_then_guaranteed_win() {
    let mut h = harness([false]);

    // 89 pulls: counting only.
    pull_times(&mut h.session, PoolKind::Limited, 89).await;
    assert_eq!(h.session.ledger().snapshot().limited.pity, 89);
    assert_eq!(h.prompt.asked(), 0);
    drain(&mut h.events);

    // 90th pull: the 50/50 is asked and lost.
    let report = h.session.pull(PoolKind::Limited).await.unwrap();
    assert_eq!(h.prompt.asked(), 1);
    assert_eq!(
        report.triggers,
        vec![TriggerOutcome::Limited {
            won: false,
            via_guarantee: false
        }]
    );
    let expected = LimitedState {
        pity: 0,
        won_tiebreak: false,
        guaranteed: true,
    };
    assert_eq!(h.session.ledger().snapshot().limited, expected);
    assert_eq!(h.store.stored(&user()).unwrap().limited, expected);
    assert_eq!(notifications(&drain(&mut h.events)), vec![LOST_TIEBREAK_MESSAGE]);

    // 90 more: the guarantee wins without asking.
    pull_times(&mut h.session, PoolKind::Limited, 90).await;
    assert_eq!(h.prompt.asked(), 1);
    assert_eq!(
        h.session.ledger().snapshot().limited,
        LimitedState {
            pity: 0,
            won_tiebreak: true,
            guaranteed: false
        }
    );
    assert_eq!(notifications(&drain(&mut h.events)), vec![WON_TIEBREAK_MESSAGE]);
}

#[tokio::test]
async fn won_tie_break_announces_win_and_stays_free() {
    let mut seed = LedgerSnapshot::default();
    seed.limited.pity = 89;
    let mut h = harness_with(seed, [true]);

    h.session.pull(PoolKind::Limited).await.unwrap();

    let limited = h.session.ledger().snapshot().limited;
    assert!(limited.won_tiebreak);
    assert!(!limited.guaranteed);
    assert_eq!(notifications(&drain(&mut h.events)), vec![WON_TIEBREAK_MESSAGE]);
}

// ---------------------------------------------------------------------------
// Test: weapon pool grants a fate point on the 80th pull
// ---------------------------------------------------------------------------

#[tokio::test]
async fn weapon_threshold_grants_fate_point() {
    let mut h = harness([]);

    pull_times(&mut h.session, PoolKind::Weapon, 80).await;

    let weapon = h.session.ledger().snapshot().weapon;
    assert_eq!(weapon.pity, 0);
    assert_eq!(weapon.fate_points, 1);
    assert_eq!(h.store.save_count(&user()), 80);
    assert!(notifications(&drain(&mut h.events)).is_empty());
}

// ---------------------------------------------------------------------------
// Test: early standard trigger resets and nothing else
// ---------------------------------------------------------------------------

#[tokio::test]
async fn early_standard_trigger_only_resets() {
    let mut seed = LedgerSnapshot::default();
    seed.standard.pity = 42;
    seed.limited.pity = 7;
    seed.weapon.fate_points = 1;
    let mut h = harness_with(seed, []);

    let report = h.session.force_early_trigger(PoolKind::Standard).await.unwrap();

    assert_eq!(report.triggers, vec![TriggerOutcome::Standard]);
    let mut expected = seed;
    expected.standard.pity = 0;
    assert_eq!(*h.session.ledger().snapshot(), expected);
    assert_eq!(h.store.stored(&user()), Some(expected));
}

#[tokio::test]
async fn early_weapon_trigger_saturates_fate_points() {
    let mut h = harness([]);
    for _ in 0..4 {
        h.session.force_early_trigger(PoolKind::Weapon).await.unwrap();
    }
    assert_eq!(h.session.ledger().snapshot().weapon.fate_points, 2);
}

// ---------------------------------------------------------------------------
// Test: removing at zero changes nothing but still saves once
// ---------------------------------------------------------------------------

#[tokio::test]
async fn remove_at_zero_still_saves_once() {
    let mut h = harness([]);

    h.session.remove_pull(PoolKind::Standard).unwrap();

    assert_eq!(*h.session.ledger().snapshot(), LedgerSnapshot::default());
    assert_eq!(h.store.save_count(&user()), 1);
    assert_matches!(
        drain(&mut h.events).as_slice(),
        [LedgerEventKind::StateChanged { .. }]
    );
}

#[tokio::test]
async fn remove_decrements() {
    let mut h = harness([]);
    pull_times(&mut h.session, PoolKind::Limited, 5).await;

    let report = h.session.remove_pull(PoolKind::Limited).unwrap();

    assert_eq!(report.pity, 4);
    assert_eq!(h.store.stored(&user()).unwrap().limited.pity, 4);
}

// ---------------------------------------------------------------------------
// Test: a bulk pull is ten single pulls
// ---------------------------------------------------------------------------

#[tokio::test]
async fn bulk_pull_matches_single_pulls() {
    let mut bulk = harness([false, true]);
    let mut single = harness([false, true]);

    for _ in 0..20 {
        bulk.session.bulk_pull(PoolKind::Limited, 10).await.unwrap();
    }
    pull_times(&mut single.session, PoolKind::Limited, 200).await;

    assert_eq!(
        bulk.session.ledger().snapshot(),
        single.session.ledger().snapshot()
    );
    assert_eq!(bulk.store.save_count(&user()), 200);
    assert_eq!(bulk.prompt.asked(), single.prompt.asked());
    assert_eq!(
        notifications(&drain(&mut bulk.events)),
        notifications(&drain(&mut single.events))
    );
}

#[tokio::test]
async fn bulk_pull_across_threshold_asks_once_and_keeps_counting() {
    let mut seed = LedgerSnapshot::default();
    seed.limited.pity = 85;
    let mut h = harness_with(seed, [false]);

    let report = h.session.bulk_pull(PoolKind::Limited, 10).await.unwrap();

    assert_eq!(report.pulls, 10);
    assert_eq!(report.triggers.len(), 1);
    assert_eq!(report.pity, 5);
    assert_eq!(h.prompt.asked(), 1);
    assert!(h.session.ledger().snapshot().limited.guaranteed);
    assert_eq!(h.store.save_count(&user()), 10);
}

#[tokio::test]
async fn bulk_weapon_pull_can_trigger_twice() {
    let mut seed = LedgerSnapshot::default();
    seed.weapon.pity = 79;
    let mut h = harness_with(seed, []);

    let report = h.session.bulk_pull(PoolKind::Weapon, 85).await.unwrap();

    assert_eq!(
        report.triggers,
        vec![
            TriggerOutcome::Weapon { fate_points: 1 },
            TriggerOutcome::Weapon { fate_points: 2 },
        ]
    );
    assert_eq!(report.pity, 4);
}

// ---------------------------------------------------------------------------
// Test: nothing is saved while the 50/50 is outstanding
// ---------------------------------------------------------------------------

#[tokio::test]
async fn no_save_while_tie_break_outstanding() {
    let store = Arc::new(MemoryStore::new());
    let mut seed = LedgerSnapshot::default();
    seed.limited.pity = 89;
    store.insert(&user(), seed);
    let (prompt, mut requests) = ChannelPrompt::new();
    let bus = Arc::new(EventBus::default());
    let mut session = LedgerSession::open(user(), Arc::clone(&store), prompt, bus).unwrap();

    let observer = Arc::clone(&store);
    let answer = async move {
        let request = requests.recv().await.unwrap();
        assert_eq!(request.pool, PoolKind::Limited);
        // Still the pre-trigger snapshot on disk.
        assert_eq!(observer.save_count(&user()), 0);
        assert_eq!(observer.stored(&user()).unwrap().limited.pity, 89);
        request.answer(false);
    };

    let (result, ()) = tokio::join!(session.pull(PoolKind::Limited), answer);
    result.unwrap();

    assert_eq!(store.save_count(&user()), 1);
    let stored = store.stored(&user()).unwrap().limited;
    assert_eq!(stored.pity, 0);
    assert!(stored.guaranteed);
}

// ---------------------------------------------------------------------------
// Test: a closed prompt abandons the trigger without saving
// ---------------------------------------------------------------------------

#[tokio::test]
async fn closed_prompt_abandons_trigger() {
    let mut seed = LedgerSnapshot::default();
    seed.limited.pity = 89;
    let mut h = harness_with(seed, []);

    let err = h.session.pull(PoolKind::Limited).await.unwrap_err();

    assert_matches!(err, SessionError::PromptClosed);
    assert_eq!(h.session.ledger().snapshot().limited, seed.limited);
    assert_eq!(h.session.ledger().pending_tie_break(), None);
    assert_eq!(h.store.save_count(&user()), 0);
    assert!(drain(&mut h.events).is_empty());

    // The ledger is usable again.
    h.session.pull(PoolKind::Standard).await.unwrap();
}

#[tokio::test]
async fn closed_prompt_stops_bulk_pull() {
    let mut seed = LedgerSnapshot::default();
    seed.limited.pity = 87;
    let mut h = harness_with(seed, []);

    let err = h.session.bulk_pull(PoolKind::Limited, 10).await.unwrap_err();

    assert_matches!(err, SessionError::PromptClosed);
    assert_eq!(h.session.ledger().snapshot().limited.pity, 89);
    assert_eq!(h.store.save_count(&user()), 2);
}

// ---------------------------------------------------------------------------
// Test: a dropped command abandons its 50/50 and frees the ledger
// ---------------------------------------------------------------------------

#[tokio::test]
async fn dropped_command_abandons_tie_break() {
    let store = Arc::new(MemoryStore::new());
    let mut seed = LedgerSnapshot::default();
    seed.limited.pity = 30;
    store.insert(&user(), seed);
    let (prompt, mut requests) = ChannelPrompt::new();
    let bus = Arc::new(EventBus::default());
    let mut events = bus.subscribe();
    let mut session = LedgerSession::open(user(), Arc::clone(&store), prompt, bus).unwrap();

    let request: TieBreakRequest = {
        let pending = session.force_early_trigger(PoolKind::Limited);
        tokio::pin!(pending);
        tokio::select! {
            biased;
            _ = &mut pending => panic!("trigger completed without an answer"),
            request = requests.recv() => request.unwrap(),
        }
    };

    assert_eq!(session.ledger().pending_tie_break(), None);
    assert_eq!(session.ledger().snapshot().limited, seed.limited);
    assert_eq!(store.save_count(&user()), 0);
    assert!(drain(&mut events).is_empty());

    // Nobody is listening for the late answer any more.
    request.answer(true);
    assert!(!session.ledger().snapshot().limited.won_tiebreak);

    // The ledger accepts commands again.
    session.remove_pull(PoolKind::Limited).unwrap();
    assert_eq!(store.stored(&user()).unwrap().limited.pity, 29);
}

// ---------------------------------------------------------------------------
// Test: a failed save keeps the change in memory and tells the front-end
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failed_save_keeps_state_and_notifies() {
    let mut h = harness([]);
    h.store.set_fail_saves(true);

    let err = h.session.pull(PoolKind::Weapon).await.unwrap_err();

    assert_matches!(err, SessionError::PersistenceUnavailable(_));
    assert_eq!(h.session.ledger().snapshot().weapon.pity, 1);
    assert_eq!(h.store.stored(&user()), None);

    let kinds = drain(&mut h.events);
    assert_matches!(
        kinds.as_slice(),
        [
            LedgerEventKind::StateChanged { view, .. },
            LedgerEventKind::Notification { message, duration_ms: 5000 },
        ] if view.pity == 1 && message.starts_with("Could not save wish data")
    );
}

#[tokio::test]
async fn failed_saves_do_not_stop_bulk_pull() {
    let mut h = harness([]);
    h.store.set_fail_saves(true);

    let err = h.session.bulk_pull(PoolKind::Standard, 10).await.unwrap_err();

    assert_matches!(err, SessionError::PersistenceUnavailable(_));
    assert_eq!(h.session.ledger().snapshot().standard.pity, 10);
    assert_eq!(h.store.save_count(&user()), 10);

    h.store.set_fail_saves(false);
    h.session.pull(PoolKind::Standard).await.unwrap();
    assert_eq!(h.store.load(&user()).unwrap().unwrap().standard.pity, 11);
}

// ---------------------------------------------------------------------------
// Test: a store that cannot load stops the session from opening
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failed_load_refuses_to_open() {
    let store = Arc::new(MemoryStore::new());
    let mut seed = LedgerSnapshot::default();
    seed.weapon.pity = 12;
    store.insert(&user(), seed);
    store.set_fail_loads(true);
    let bus = Arc::new(EventBus::default());
    let mut events = bus.subscribe();

    let result = LedgerSession::open(user(), Arc::clone(&store), ScriptedPrompt::new([]), bus);

    assert_matches!(result.err(), Some(SessionError::PersistenceUnavailable(_)));
    assert_eq!(store.save_count(&user()), 0);
    assert_eq!(store.stored(&user()), Some(seed));
    assert!(drain(&mut events).is_empty());
}
