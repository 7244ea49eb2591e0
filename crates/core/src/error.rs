use crate::pool::PoolKind;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Unknown pool kind '{0}'. Must be one of: limited, weapon, standard")]
    InvalidPoolKind(String),

    #[error("Invalid user id: {0}")]
    InvalidUserId(String),

    #[error("A 50/50 answer is still outstanding for the {pool} pool")]
    TieBreakPending { pool: PoolKind },

    #[error("No matching 50/50 is awaiting an answer")]
    NoPendingTieBreak,
}
