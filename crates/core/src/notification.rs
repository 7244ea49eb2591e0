//! User-facing notification texts.

use serde::{Deserialize, Serialize};

/// Shown when the 50/50 was lost.
pub const LOST_TIEBREAK_MESSAGE: &str = "You lost the 50/50. Next 5★ is guaranteed!";

/// Shown whenever a limited trigger ends as a win.
pub const WON_TIEBREAK_MESSAGE: &str = "You won the 50/50!";

/// Display time for 50/50 outcome messages.
pub const TIEBREAK_NOTICE_MS: u64 = 4000;

/// Display time for persistence failure notices.
pub const PERSISTENCE_NOTICE_MS: u64 = 5000;

/// An ephemeral message for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub message: String,
    /// How long the message should stay on screen.
    pub duration_ms: u64,
}

impl Notification {
    pub fn new(message: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            message: message.into(),
            duration_ms,
        }
    }

    pub fn tie_break(won: bool) -> Self {
        let message = if won {
            WON_TIEBREAK_MESSAGE
        } else {
            LOST_TIEBREAK_MESSAGE
        };
        Self::new(message, TIEBREAK_NOTICE_MS)
    }

    pub fn persistence_failed(error: &impl std::fmt::Display) -> Self {
        Self::new(
            format!("Could not save wish data: {error}"),
            PERSISTENCE_NOTICE_MS,
        )
    }
}
