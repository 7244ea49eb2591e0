//! Terminal rendering of views and bus events.

use tokio::sync::broadcast;
use wishtrack_core::PoolView;
use wishtrack_events::{LedgerEvent, LedgerEventKind};

pub fn print_view(view: &PoolView) {
    println!("{view}");
}

/// Line shown for a bus event, if the terminal shows it at all.
///
/// State changes are skipped: the REPL prints the affected pool once per
/// command instead of once per pull.
pub fn event_line(event: &LedgerEvent) -> Option<String> {
    match &event.kind {
        LedgerEventKind::Notification { message, .. } => Some(format!("*** {message} ***")),
        LedgerEventKind::StateChanged { .. } => None,
    }
}

/// Print notifications until the bus closes.
pub async fn print_events(mut receiver: broadcast::Receiver<LedgerEvent>) {
    loop {
        match receiver.recv().await {
            Ok(event) => {
                if let Some(line) = event_line(&event) {
                    println!("{line}");
                }
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                tracing::warn!(skipped = n, "Terminal fell behind, some notifications were not shown");
            }
            Err(broadcast::error::RecvError::Closed) => {
                tracing::debug!("Event bus closed, printer stopping");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use wishtrack_core::{LedgerSnapshot, Notification, PoolKind, UserId};

    use super::*;

    #[test]
    fn notifications_are_shown() {
        let event = LedgerEvent::notification(UserId::default(), Notification::tie_break(true));
        assert_eq!(event_line(&event).unwrap(), "*** You won the 50/50! ***");
    }

    #[test]
    fn state_changes_are_not() {
        let view = PoolView::of(&LedgerSnapshot::default(), PoolKind::Limited);
        let event = LedgerEvent::state_changed(UserId::default(), view);
        assert_eq!(event_line(&event), None);
    }
}
