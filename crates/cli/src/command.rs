//! REPL command parsing.

use wishtrack_core::{CoreError, PoolKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Pull(PoolKind),
    Bulk(PoolKind),
    Remove(PoolKind),
    Early(PoolKind),
    Show(Option<PoolKind>),
    Help,
    Quit,
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Unknown command '{0}'. Type 'help' for the list.")]
    Unknown(String),

    #[error("'{0}' needs a pool: limited, weapon or standard")]
    MissingPool(&'static str),

    #[error(transparent)]
    Pool(#[from] CoreError),

    #[error("Unexpected input after command: '{0}'")]
    Trailing(String),
}

pub const HELP: &str = "\
Commands:
  pull <pool>     single pull
  ten <pool>      multi-pull
  remove <pool>   remove one pull
  early <pool>    record an early 5★
  show [pool]     show pity
  help            this list
  quit            leave
Pools: limited, weapon, standard";

impl Command {
    /// `Ok(None)` for a blank line.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(None);
        };
        let pool = words.next().map(str::parse::<PoolKind>).transpose()?;
        if let Some(extra) = words.next() {
            return Err(CommandError::Trailing(extra.to_string()));
        }

        let needs_pool = |name: &'static str| pool.ok_or(CommandError::MissingPool(name));
        let command = match verb.to_ascii_lowercase().as_str() {
            "pull" | "single" => Command::Pull(needs_pool("pull")?),
            "ten" | "multi" | "10" => Command::Bulk(needs_pool("ten")?),
            "remove" | "undo" => Command::Remove(needs_pool("remove")?),
            "early" => Command::Early(needs_pool("early")?),
            "show" => Command::Show(pool),
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(Some(command))
    }
}
