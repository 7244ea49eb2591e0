//! Asks the 50/50 question on the terminal.

use std::io::Write;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, Lines};
use tokio::sync::Mutex;
use wishtrack_core::PoolKind;
use wishtrack_session::{PromptError, TieBreakPrompt};

/// Input lines shared by the REPL and the prompt. Only one of them reads at
/// a time: the REPL never holds the lock while a command runs.
pub type SharedLines<R> = Arc<Mutex<Lines<R>>>;

pub const QUESTION: &str = "Did you win the 50/50? [y/n] ";

/// `y`/`yes` is a win, `n`/`no` a loss, anything else is unreadable.
pub fn parse_answer(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

pub struct LinePrompt<R> {
    input: SharedLines<R>,
}

impl<R> LinePrompt<R> {
    pub fn new(input: SharedLines<R>) -> Self {
        Self { input }
    }
}

#[async_trait]
impl<R> TieBreakPrompt for LinePrompt<R>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    async fn request_tie_break(&self, _pool: PoolKind) -> Result<bool, PromptError> {
        let mut lines = self.input.lock().await;
        loop {
            print!("{QUESTION}");
            // A failed flush only delays the question text.
            let _ = std::io::stdout().flush();

            match lines.next_line().await {
                Ok(Some(line)) => match parse_answer(&line) {
                    Some(won) => return Ok(won),
                    None => println!("Please answer y or n."),
                },
                Ok(None) => return Err(PromptError::Closed),
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to read 50/50 answer");
                    return Err(PromptError::Closed);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncBufReadExt, BufReader};

    use super::*;

    fn prompt(input: &'static str) -> LinePrompt<BufReader<&'static [u8]>> {
        let lines = BufReader::new(input.as_bytes()).lines();
        LinePrompt::new(Arc::new(Mutex::new(lines)))
    }

    #[test]
    fn answers() {
        assert_eq!(parse_answer("Y"), Some(true));
        assert_eq!(parse_answer(" yes "), Some(true));
        assert_eq!(parse_answer("n"), Some(false));
        assert_eq!(parse_answer("NO"), Some(false));
        assert_eq!(parse_answer("maybe"), None);
        assert_eq!(parse_answer(""), None);
    }

    #[tokio::test]
    async fn reasks_until_readable() {
        let prompt = prompt("perhaps\n\nno\n");
        assert_eq!(prompt.request_tie_break(PoolKind::Limited).await, Ok(false));
    }

    #[tokio::test]
    async fn end_of_input_closes() {
        let prompt = prompt("what\n");
        assert_eq!(
            prompt.request_tie_break(PoolKind::Limited).await,
            Err(PromptError::Closed)
        );
    }
}
