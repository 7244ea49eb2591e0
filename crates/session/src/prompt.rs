//! The 50/50 question, asked of whatever front-end is attached.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use wishtrack_core::PoolKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PromptError {
    #[error("prompt closed before answering")]
    Closed,
}

/// Asks the user whether a 50/50 was won.
///
/// Implementations must produce exactly one answer per call. The session
/// never starts a second request before the first returns.
#[async_trait]
pub trait TieBreakPrompt: Send + Sync {
    async fn request_tie_break(&self, pool: PoolKind) -> Result<bool, PromptError>;
}

#[async_trait]
impl<P: TieBreakPrompt + ?Sized> TieBreakPrompt for Arc<P> {
    async fn request_tie_break(&self, pool: PoolKind) -> Result<bool, PromptError> {
        (**self).request_tie_break(pool).await
    }
}

// ---------------------------------------------------------------------------
// Channel prompt
// ---------------------------------------------------------------------------

/// An outstanding question delivered to a front-end task.
#[derive(Debug)]
pub struct TieBreakRequest {
    pub pool: PoolKind,
    reply: oneshot::Sender<bool>,
}

impl TieBreakRequest {
    /// Answer the question. Dropping the request unanswered closes the prompt.
    pub fn answer(self, won: bool) {
        if self.reply.send(won).is_err() {
            tracing::debug!(pool = %self.pool, "50/50 answer arrived after the session stopped waiting");
        }
    }
}

/// Forwards each question over an `mpsc` channel and waits on a oneshot reply.
#[derive(Debug, Clone)]
pub struct ChannelPrompt {
    tx: mpsc::Sender<TieBreakRequest>,
}

impl ChannelPrompt {
    pub fn new() -> (Self, mpsc::Receiver<TieBreakRequest>) {
        // At most one request is ever outstanding.
        let (tx, rx) = mpsc::channel(1);
        (Self { tx }, rx)
    }
}

#[async_trait]
impl TieBreakPrompt for ChannelPrompt {
    async fn request_tie_break(&self, pool: PoolKind) -> Result<bool, PromptError> {
        let (reply, answer) = oneshot::channel();
        self.tx
            .send(TieBreakRequest { pool, reply })
            .await
            .map_err(|_| PromptError::Closed)?;
        answer.await.map_err(|_| PromptError::Closed)
    }
}

// ---------------------------------------------------------------------------
// Scripted prompt
// ---------------------------------------------------------------------------

/// Answers from a fixed queue; closes once the queue runs dry.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: Mutex<VecDeque<bool>>,
    asked: AtomicUsize,
}

impl ScriptedPrompt {
    pub fn new(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            asked: AtomicUsize::new(0),
        }
    }

    /// How many questions have been asked so far.
    pub fn asked(&self) -> usize {
        self.asked.load(Ordering::SeqCst)
    }

    pub fn remaining(&self) -> usize {
        self.answers.lock().map_or(0, |q| q.len())
    }
}

#[async_trait]
impl TieBreakPrompt for ScriptedPrompt {
    async fn request_tie_break(&self, _pool: PoolKind) -> Result<bool, PromptError> {
        self.asked.fetch_add(1, Ordering::SeqCst);
        self.answers
            .lock()
            .map_err(|_| PromptError::Closed)?
            .pop_front()
            .ok_or(PromptError::Closed)
    }
}
