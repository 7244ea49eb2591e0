//! In-memory backend with save accounting and failure injection.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use wishtrack_core::{LedgerSnapshot, UserId};

use crate::error::StoreError;
use crate::SnapshotStore;

#[derive(Debug, Default)]
struct Entry {
    snapshot: Option<LedgerSnapshot>,
    saves: usize,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<UserId, Entry>>,
    fail_saves: AtomicBool,
    fail_loads: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a snapshot without counting it as a save.
    pub fn insert(&self, user: &UserId, snapshot: LedgerSnapshot) {
        self.lock().entry(user.clone()).or_default().snapshot = Some(snapshot);
    }

    /// Number of `save` calls for `user`, failed ones included.
    pub fn save_count(&self, user: &UserId) -> usize {
        self.lock().get(user).map_or(0, |e| e.saves)
    }

    pub fn stored(&self, user: &UserId) -> Option<LedgerSnapshot> {
        self.lock().get(user).and_then(|e| e.snapshot)
    }

    /// While set, every save fails with an I/O error and stores nothing.
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// While set, every load fails with an I/O error.
    pub fn set_fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<UserId, Entry>> {
        // Entries are replaced whole, so a poisoned map is still consistent.
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self, user: &UserId) -> Result<Option<LedgerSnapshot>, StoreError> {
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(injected_failure(user, "injected load failure"));
        }
        Ok(self.stored(user))
    }

    fn save(&self, user: &UserId, snapshot: &LedgerSnapshot) -> Result<(), StoreError> {
        let mut entries = self.lock();
        let entry = entries.entry(user.clone()).or_default();
        entry.saves += 1;
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(injected_failure(user, "injected save failure"));
        }
        entry.snapshot = Some(*snapshot);
        Ok(())
    }
}

fn injected_failure(user: &UserId, what: &str) -> StoreError {
    StoreError::io(
        PathBuf::from(format!("memory://{user}")),
        io::Error::other(what.to_string()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_user_loads_none() {
        let store = MemoryStore::new();
        assert!(store.load(&UserId::default()).unwrap().is_none());
        assert_eq!(store.save_count(&UserId::default()), 0);
    }

    #[test]
    fn insert_does_not_count_as_save() {
        let store = MemoryStore::new();
        let user = UserId::default();
        store.insert(&user, LedgerSnapshot::default());
        assert_eq!(store.save_count(&user), 0);
        assert_eq!(store.load(&user).unwrap(), Some(LedgerSnapshot::default()));
    }

    #[test]
    fn failing_saves_are_counted_but_not_stored() {
        let store = MemoryStore::new();
        let user = UserId::default();
        let mut snapshot = LedgerSnapshot::default();
        snapshot.standard.pity = 3;

        store.set_fail_saves(true);
        assert!(store.save(&user, &snapshot).is_err());
        assert_eq!(store.save_count(&user), 1);
        assert_eq!(store.stored(&user), None);

        store.set_fail_saves(false);
        store.save(&user, &snapshot).unwrap();
        assert_eq!(store.save_count(&user), 2);
        assert_eq!(store.stored(&user), Some(snapshot));
    }

    #[test]
    fn failing_loads_surface_as_io() {
        let store = MemoryStore::new();
        let user = UserId::default();
        store.insert(&user, LedgerSnapshot::default());

        store.set_fail_loads(true);
        assert!(matches!(store.load(&user), Err(StoreError::Io { .. })));

        store.set_fail_loads(false);
        assert_eq!(store.load(&user).unwrap(), Some(LedgerSnapshot::default()));
    }
}
