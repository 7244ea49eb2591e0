//! Read-eval-print loop over a [`LedgerSession`].

use std::io::Write;

use tokio::io::AsyncBufRead;
use wishtrack_core::PoolKind;
use wishtrack_session::{LedgerSession, SessionError, TieBreakPrompt};
use wishtrack_store::SnapshotStore;

use crate::command::{Command, HELP};
use crate::prompt::SharedLines;
use crate::render::print_view;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Read commands until `quit` or end of input.
pub async fn run<S, P, R>(
    session: &mut LedgerSession<S, P>,
    input: SharedLines<R>,
    bulk_size: u32,
) -> anyhow::Result<()>
where
    S: SnapshotStore,
    P: TieBreakPrompt,
    R: AsyncBufRead + Unpin,
{
    println!("Tracking wishes for {}", session.user());
    for pool in PoolKind::ALL {
        print_view(&session.view(pool));
    }
    println!("{HELP}");

    loop {
        print!("> ");
        // A failed flush only delays the prompt marker.
        let _ = std::io::stdout().flush();

        let line = input.lock().await.next_line().await?;
        let Some(line) = line else {
            tracing::debug!("End of input");
            break;
        };

        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };

        if execute(session, command, bulk_size).await == Flow::Quit {
            break;
        }
    }
    Ok(())
}

/// Run one command and print its result. Errors are reported, not returned.
pub async fn execute<S, P>(
    session: &mut LedgerSession<S, P>,
    command: Command,
    bulk_size: u32,
) -> Flow
where
    S: SnapshotStore,
    P: TieBreakPrompt,
{
    let result = match command {
        Command::Pull(pool) => session.pull(pool).await.map(|r| r.pool),
        Command::Bulk(pool) => session.bulk_pull(pool, bulk_size).await.map(|r| r.pool),
        Command::Remove(pool) => session.remove_pull(pool).map(|r| r.pool),
        Command::Early(pool) => session.force_early_trigger(pool).await.map(|r| r.pool),
        Command::Show(Some(pool)) => Ok(pool),
        Command::Show(None) => {
            for pool in PoolKind::ALL {
                print_view(&session.view(pool));
            }
            return Flow::Continue;
        }
        Command::Help => {
            println!("{HELP}");
            return Flow::Continue;
        }
        Command::Quit => return Flow::Quit,
    };

    match result {
        Ok(pool) => print_view(&session.view(pool)),
        // Already announced on the bus; the in-memory state is still current.
        Err(SessionError::PersistenceUnavailable(_)) => {
            if let Some(pool) = command_pool(command) {
                print_view(&session.view(pool));
            }
        }
        Err(SessionError::PromptClosed) => println!("No 50/50 answer given; the 5★ was not recorded."),
        Err(e) => println!("{e}"),
    }
    Flow::Continue
}

fn command_pool(command: Command) -> Option<PoolKind> {
    match command {
        Command::Pull(pool)
        | Command::Bulk(pool)
        | Command::Remove(pool)
        | Command::Early(pool)
        | Command::Show(Some(pool)) => Some(pool),
        _ => None,
    }
}
