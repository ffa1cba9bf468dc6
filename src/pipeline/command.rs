/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 25/8/26
******************************************************************************/

//! Command types carried through the pipeline.
//!
//! A [`Command`] pairs the closure to run against the pipeline's owned state
//! with an optional one-shot completion channel. Fire-and-forget submissions
//! carry no channel; awaited submissions are answered on theirs strictly
//! before the pending count is decremented.

use thiserror::Error;
use tokio::sync::oneshot;

/// Boxed closure executed by the processing stage against the owned state.
pub type CommandTask<S> = Box<dyn FnOnce(&mut S) + Send + 'static>;

/// Outcome delivered on a command's completion channel.
pub type CommandOutcome = Result<(), CommandFault>;

/// Failure of a single command's task.
///
/// Produced when a task panics; the panic payload is stringified and the
/// pipeline itself keeps running.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("command panicked: {message}")]
pub struct CommandFault {
    /// Stringified panic payload.
    pub message: String,
}

/// One unit of work accepted by the pipeline.
pub struct Command<S> {
    task: CommandTask<S>,
    completion: Option<oneshot::Sender<CommandOutcome>>,
}

impl<S> Command<S> {
    /// Creates a fire-and-forget command.
    #[must_use]
    pub fn new(task: CommandTask<S>) -> Self {
        Self {
            task,
            completion: None,
        }
    }

    /// Creates a command whose outcome is reported on `completion`.
    #[must_use]
    pub fn with_completion(
        task: CommandTask<S>,
        completion: oneshot::Sender<CommandOutcome>,
    ) -> Self {
        Self {
            task,
            completion: Some(completion),
        }
    }

    /// Returns `true` if a caller is waiting on this command's outcome.
    #[must_use]
    pub fn is_awaited(&self) -> bool {
        self.completion.is_some()
    }

    pub(crate) fn into_parts(self) -> (CommandTask<S>, Option<oneshot::Sender<CommandOutcome>>) {
        (self.task, self.completion)
    }
}

impl<S> std::fmt::Debug for Command<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("awaited", &self.completion.is_some())
            .finish_non_exhaustive()
    }
}
