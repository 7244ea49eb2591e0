//! Drives a [`PityLedger`](wishtrack_core::PityLedger) for one user:
//! write-through persistence after every completed command, events for the
//! front-end, and the suspend/resume 50/50 prompt.

pub mod error;
pub mod prompt;
pub mod session;

pub use error::{SessionError, SessionResult};
pub use prompt::{ChannelPrompt, PromptError, ScriptedPrompt, TieBreakPrompt, TieBreakRequest};
pub use session::{CommandReport, LedgerSession};
