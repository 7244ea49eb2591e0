use wishtrack_core::CoreError;
use wishtrack_store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The in-memory ledger kept the change; only the save failed.
    #[error("Persistence unavailable: {0}")]
    PersistenceUnavailable(#[from] StoreError),

    /// The front-end went away before answering the 50/50.
    #[error("The 50/50 prompt closed without an answer")]
    PromptClosed,
}

pub type SessionResult<T> = Result<T, SessionError>;
