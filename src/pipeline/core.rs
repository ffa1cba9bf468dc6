/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 25/8/26
******************************************************************************/

//! Core Processor implementation.
//!
//! This module provides the main Processor struct that owns the two pipeline
//! stages and the state they guard. Commands flow through an ingress queue
//! into a processing queue; the processing stage's thread is the only code
//! that ever touches the state, so command execution is totally ordered and
//! needs no locks.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tokio::sync::oneshot;

use super::command::{Command, CommandFault};
use super::pending::PendingCounter;
use super::ring::{self, QueueClosed, RingProducer};
use super::stage::{Stage, StageState, panic_message};
use super::wait::{BlockingWaitStrategy, BusySpinWaitStrategy, WaitStrategy};

/// Default slot count for both queues.
pub const DEFAULT_CAPACITY: usize = 1024;

const INGRESS_THREAD: &str = "storepipe-ingress";
const PROCESSING_THREAD: &str = "storepipe-processing";

/// Errors that can occur when interacting with the Processor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// The pipeline no longer accepts submissions.
    #[error("pipeline has been shut down")]
    Shutdown,

    /// The command's task panicked while executing.
    #[error("command panicked: {message}")]
    CommandPanicked {
        /// Stringified panic payload.
        message: String,
    },

    /// The pipeline stopped before the command's completion was delivered.
    #[error("pipeline stopped before the command completed")]
    Disconnected,
}

/// Construction-time tuning for a [`Processor`].
///
/// The defaults replicate the intended deployment shape: a generously sized
/// queue, parked producers on the ingress side, and a hot spinning consumer
/// on the processing side.
#[derive(Clone)]
pub struct PipelineConfig {
    /// Slot count for each queue, rounded up to a power of two.
    pub capacity: usize,

    /// Wait strategy for the ingress queue.
    pub ingress_wait: Arc<dyn WaitStrategy>,

    /// Wait strategy for the processing queue.
    pub processing_wait: Arc<dyn WaitStrategy>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            ingress_wait: Arc::new(BlockingWaitStrategy::new()),
            processing_wait: Arc::new(BusySpinWaitStrategy::new()),
        }
    }
}

impl std::fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

/// A two-stage command processor owning a single-writer state.
///
/// `Processor` accepts closures from any number of threads, funnels them
/// through an ingress queue into a processing queue, and executes them one
/// at a time on a dedicated thread that owns the state. Submission order
/// per producer is preserved; execution order is a single global sequence.
///
/// Shutting down closes the ingress queue first and joins both stage
/// threads in turn, so every accepted command is executed before
/// [`Processor::shutdown`] returns. Dropping the processor shuts it down.
///
/// # Examples
///
/// ```
/// use storepipe_rs::pipeline::Processor;
///
/// let processor = Processor::new(0u64);
/// processor.submit(|n| *n += 1)?;
/// assert_eq!(processor.submit_and_await(|n| *n)?, 1);
/// processor.shutdown();
/// # Ok::<(), storepipe_rs::pipeline::PipelineError>(())
/// ```
pub struct Processor<S: Send + 'static> {
    ingress_tx: RingProducer<Command<S>>,
    processing_tx: RingProducer<Command<S>>,
    pending: Arc<PendingCounter>,
    faults: Arc<AtomicU64>,
    ingress: Stage,
    processing: Stage,
}

impl<S: Send + 'static> Processor<S> {
    /// Creates a processor around `state` with the default configuration.
    ///
    /// Both stage threads start immediately; the processing thread takes
    /// ownership of `state` for the lifetime of the pipeline.
    #[must_use]
    pub fn new(state: S) -> Self {
        Self::with_config(state, PipelineConfig::default())
    }

    /// Creates a processor with explicit queue capacity and wait strategies.
    #[must_use]
    pub fn with_config(state: S, config: PipelineConfig) -> Self {
        let pending = Arc::new(PendingCounter::new());
        let faults = Arc::new(AtomicU64::new(0));

        let (ingress_tx, ingress_rx) =
            ring::bounded(config.capacity, Arc::clone(&config.ingress_wait));
        let (processing_tx, processing_rx) =
            ring::bounded(config.capacity, Arc::clone(&config.processing_wait));

        let handler_pending = Arc::clone(&pending);
        let handler_faults = Arc::clone(&faults);
        let mut state = state;
        let processing = Stage::spawn(
            PROCESSING_THREAD,
            processing_rx,
            move |sequence, command: Command<S>| {
                let (task, completion) = command.into_parts();
                let state_ref = &mut state;
                let outcome = match catch_unwind(AssertUnwindSafe(move || task(state_ref))) {
                    Ok(()) => Ok(()),
                    Err(payload) => {
                        let message = panic_message(payload.as_ref());
                        handler_faults.fetch_add(1, Ordering::Relaxed);
                        tracing::error!(sequence, message = %message, "command panicked");
                        Err(CommandFault { message })
                    }
                };
                // Completion goes out before the pending count drops: a
                // drain barrier must never release before awaited callers
                // have their answer.
                if let Some(reply) = completion {
                    let _ = reply.send(outcome);
                }
                handler_pending.decrement();
            },
        );

        let forward = processing_tx.clone();
        let forward_pending = Arc::clone(&pending);
        let ingress = Stage::spawn(
            INGRESS_THREAD,
            ingress_rx,
            move |_sequence, command: Command<S>| match forward.claim() {
                Ok(sequence) => forward.publish(sequence, command),
                Err(QueueClosed) => {
                    // Orderly shutdown closes the processing queue only
                    // after this stage has drained, so this arm is
                    // unreachable unless the pipeline was torn down early.
                    tracing::error!("processing queue closed under the ingress stage");
                    forward_pending.decrement();
                }
            },
        );

        Self {
            ingress_tx,
            processing_tx,
            pending,
            faults,
            ingress,
            processing,
        }
    }

    /// Submits a fire-and-forget command.
    ///
    /// Returns as soon as the command is accepted; blocks only while the
    /// ingress queue is full. The task runs on the processing thread with
    /// exclusive access to the state.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Shutdown`] if the pipeline has been shut
    /// down. The task is not executed in that case.
    pub fn submit<F>(&self, task: F) -> Result<(), PipelineError>
    where
        F: FnOnce(&mut S) + Send + 'static,
    {
        self.submit_command(Command::new(Box::new(task)))
    }

    /// Submits a command and blocks until it has executed, returning its
    /// result.
    ///
    /// Commands submitted earlier by the same thread are guaranteed to have
    /// executed by the time this returns.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::Shutdown`] if the pipeline no longer accepts work
    /// - [`PipelineError::CommandPanicked`] if the task panicked
    /// - [`PipelineError::Disconnected`] if the pipeline stopped before the
    ///   outcome was delivered
    pub fn submit_and_await<F, R>(&self, task: F) -> Result<R, PipelineError>
    where
        F: FnOnce(&mut S) -> R + Send + 'static,
        R: Send + 'static,
    {
        let (value_tx, value_rx) = oneshot::channel();
        let (done_tx, done_rx) = oneshot::channel();

        let task = Box::new(move |state: &mut S| {
            let value = task(state);
            let _ = value_tx.send(value);
        });
        self.submit_command(Command::with_completion(task, done_tx))?;

        match done_rx.blocking_recv() {
            Ok(Ok(())) => value_rx
                .blocking_recv()
                .map_err(|_| PipelineError::Disconnected),
            Ok(Err(fault)) => Err(PipelineError::CommandPanicked {
                message: fault.message,
            }),
            Err(_) => Err(PipelineError::Disconnected),
        }
    }

    fn submit_command(&self, command: Command<S>) -> Result<(), PipelineError> {
        let sequence = self.ingress_tx.claim().map_err(|_| {
            tracing::debug!(awaited = command.is_awaited(), "submission rejected after shutdown");
            PipelineError::Shutdown
        })?;
        // The count must cover the command before it becomes visible to
        // the ingress stage; the processing stage decrements only after
        // fulfilling the completion.
        self.pending.increment();
        self.ingress_tx.publish(sequence, command);
        Ok(())
    }

    /// Blocks until every command accepted so far has been processed.
    ///
    /// The barrier is best-effort: submissions racing with the drain may
    /// extend the wait.
    pub fn drain(&self) {
        self.pending.wait_zero();
    }

    /// Shuts the pipeline down, executing all accepted commands first.
    ///
    /// Closes the ingress queue, joins the ingress stage once it has
    /// forwarded its backlog, then closes and joins the processing stage.
    /// Idempotent; concurrent callers block until the stages are stopped.
    /// Submissions racing with the close either fail with
    /// [`PipelineError::Shutdown`] or are executed, never silently lost.
    pub fn shutdown(&self) {
        let first = !self.ingress_tx.is_closed();
        if first {
            tracing::debug!("pipeline shutdown requested");
        }
        self.ingress.begin_drain();
        self.processing.begin_drain();
        self.ingress_tx.close();
        self.ingress.join();
        self.processing_tx.close();
        self.processing.join();
        if first {
            tracing::debug!("pipeline stages stopped");
        }
    }

    /// Number of commands accepted but not yet fully processed.
    #[must_use]
    pub fn pending_count(&self) -> u64 {
        self.pending.get()
    }

    /// Number of commands whose task panicked.
    #[must_use]
    pub fn fault_count(&self) -> u64 {
        self.faults.load(Ordering::Relaxed)
    }

    /// Current lifecycle state of the ingress and processing stages.
    #[must_use]
    pub fn stage_states(&self) -> (StageState, StageState) {
        (self.ingress.state(), self.processing.state())
    }

    /// Slot count of each queue.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.ingress_tx.capacity()
    }

    /// Returns `true` once [`Processor::shutdown`] has begun.
    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        self.ingress_tx.is_closed()
    }
}

impl<S: Send + 'static> Drop for Processor<S> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
