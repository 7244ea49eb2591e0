//! Persistence backends for pity ledgers.
//!
//! One snapshot per user identity. Saves are synchronous and replace the
//! previous snapshot wholesale.

pub mod error;
pub mod file;
pub mod memory;

use wishtrack_core::{LedgerSnapshot, UserId};

pub use error::StoreError;
pub use file::JsonFileStore;
pub use memory::MemoryStore;

/// Durable key-value store keyed by user identity.
pub trait SnapshotStore {
    /// `Ok(None)` when the user has never been saved.
    fn load(&self, user: &UserId) -> Result<Option<LedgerSnapshot>, StoreError>;

    fn save(&self, user: &UserId, snapshot: &LedgerSnapshot) -> Result<(), StoreError>;
}

impl<S: SnapshotStore + ?Sized> SnapshotStore for &S {
    fn load(&self, user: &UserId) -> Result<Option<LedgerSnapshot>, StoreError> {
        (**self).load(user)
    }

    fn save(&self, user: &UserId, snapshot: &LedgerSnapshot) -> Result<(), StoreError> {
        (**self).save(user, snapshot)
    }
}

impl<S: SnapshotStore + ?Sized> SnapshotStore for std::sync::Arc<S> {
    fn load(&self, user: &UserId) -> Result<Option<LedgerSnapshot>, StoreError> {
        (**self).load(user)
    }

    fn save(&self, user: &UserId, snapshot: &LedgerSnapshot) -> Result<(), StoreError> {
        (**self).save(user, snapshot)
    }
}
