//! Domain core of the wish pity tracker.
//!
//! Owns the three pools' pity counters and the limited pool's 50/50
//! guarantee. Nothing here performs I/O; see `wishtrack-session` for the
//! write-through and prompting flow built on top of [`PityLedger`].

pub mod error;
pub mod ledger;
pub mod notification;
pub mod pool;
pub mod state;
pub mod types;
pub mod view;

pub use error::CoreError;
pub use ledger::{PityLedger, PullOutcome, TieBreakTicket, TriggerOutcome};
pub use notification::Notification;
pub use pool::PoolKind;
pub use state::LedgerSnapshot;
pub use types::UserId;
pub use view::PoolView;
