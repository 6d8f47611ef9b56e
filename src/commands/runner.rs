//! Command runner: one natural-language command in, one board change out.
//!
//! DESIGN
//! ======
//! The local intent recognizer gets the first look. Only commands it does
//! not claim reach the translator, and the board lock is not held while the
//! translator works. The resulting operations are applied under a single
//! write lock through the dispatcher; `summarizeBoard` is answered here from
//! the board and never dispatched.
//!
//! Progress is published as a [`CommandStatus`] on a watch channel. A
//! failure stays visible for the configured display duration, then the
//! status returns to `Idle` on its own. Nothing is retried.

#[cfg(test)]
#[path = "runner_test.rs"]
mod runner_test;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::dispatch::{execute, summarize};
use super::intent::IntentRecognizer;
use super::translator::CommandTranslator;
use super::{CommandError, Operation, OperationName};
use crate::doc::ObjectId;
use crate::error::ErrorCode;
use crate::session::SharedBoard;

// =============================================================================
// TYPES
// =============================================================================

/// Command progress as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CommandStatus {
    #[default]
    Idle,
    Thinking,
    Failed { message: String, until: Instant },
}

impl CommandStatus {
    /// The status as it reads at `now`; an expired failure reads as `Idle`.
    #[must_use]
    pub fn at(&self, now: Instant) -> Self {
        match self {
            Self::Failed { until, .. } if now >= *until => Self::Idle,
            other => other.clone(),
        }
    }
}

/// Where a command's operations came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeSource {
    Local,
    Llm,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutcome {
    pub source: OutcomeSource,
    pub applied: usize,
    pub skipped: Vec<String>,
    pub created: Vec<ObjectId>,
    /// Board description, when the command asked about the board.
    pub summary: Option<String>,
}

// =============================================================================
// RUNNER
// =============================================================================

pub struct CommandRunner {
    board: SharedBoard,
    recognizer: IntentRecognizer,
    translator: Option<Arc<dyn CommandTranslator>>,
    error_display: Duration,
    status: Arc<watch::Sender<CommandStatus>>,
}

impl CommandRunner {
    /// # Errors
    ///
    /// Returns `Pattern` if the intent rules fail to compile.
    pub fn new(
        board: SharedBoard,
        translator: Option<Arc<dyn CommandTranslator>>,
        error_display: Duration,
    ) -> Result<Self, CommandError> {
        let (status, _) = watch::channel(CommandStatus::Idle);
        Ok(Self { board, recognizer: IntentRecognizer::new()?, translator, error_display, status: Arc::new(status) })
    }

    #[must_use]
    pub fn status(&self) -> CommandStatus {
        self.status.borrow().at(Instant::now())
    }

    #[must_use]
    pub fn subscribe_status(&self) -> watch::Receiver<CommandStatus> {
        self.status.subscribe()
    }

    /// Run one command against the board.
    ///
    /// # Errors
    ///
    /// Returns `LlmNotConfigured` when the command needs the translator and
    /// none is configured, or whatever the translator failed with. The
    /// failure is also published as `CommandStatus::Failed`.
    pub async fn run(&self, command: &str) -> Result<CommandOutcome, CommandError> {
        let command = command.trim();
        if command.is_empty() {
            return Ok(CommandOutcome {
                source: OutcomeSource::Local,
                applied: 0,
                skipped: Vec::new(),
                created: Vec::new(),
                summary: None,
            });
        }

        let (source, ops) = match self.recognizer.recognize(command) {
            Some(intent) => {
                info!(?intent, "runner: handled locally");
                (OutcomeSource::Local, intent.operations())
            }
            None => match self.translate(command).await {
                Ok(ops) => (OutcomeSource::Llm, ops),
                Err(e) => return Err(self.fail(e)),
            },
        };

        let mut board = self.board.write().await;
        let asks_summary = ops.iter().any(|op| op.kind() == Some(OperationName::SummarizeBoard));
        let summary = asks_summary.then(|| summarize(board.objects()));
        let rest: Vec<Operation> = ops
            .into_iter()
            .filter(|op| op.kind() != Some(OperationName::SummarizeBoard))
            .collect();
        let report = execute(&mut board, &rest);
        drop(board);

        self.status.send_modify(|s| *s = CommandStatus::Idle);
        info!(?source, applied = report.applied, skipped = report.skipped.len(), "runner: command applied");
        Ok(CommandOutcome {
            source,
            applied: report.applied + usize::from(asks_summary),
            skipped: report.skipped,
            created: report.created,
            summary,
        })
    }

    async fn translate(&self, command: &str) -> Result<Vec<Operation>, CommandError> {
        let translator = self.translator.as_ref().ok_or(CommandError::LlmNotConfigured)?;
        self.status.send_modify(|s| *s = CommandStatus::Thinking);
        let summaries = self.board.read().await.summaries();
        translator.translate(command, &summaries).await
    }

    /// Publish `err` as a timed failure and hand it back.
    fn fail(&self, err: CommandError) -> CommandError {
        warn!(error = %err, code = err.error_code(), "runner: command failed");
        let until = Instant::now() + self.error_display;
        let message = err.user_message();
        self.status
            .send_modify(|s| *s = CommandStatus::Failed { message, until });

        let status = Arc::clone(&self.status);
        tokio::spawn(async move {
            tokio::time::sleep_until(until).await;
            let expired = status.send_if_modified(|current| match current {
                CommandStatus::Failed { until: shown, .. } if *shown == until => {
                    *current = CommandStatus::Idle;
                    true
                }
                _ => false,
            });
            if expired {
                debug!("runner: failure display expired");
            }
        });
        err
    }
}
