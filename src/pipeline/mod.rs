/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 25/8/26
******************************************************************************/

//! Two-stage pipeline for totally-ordered command execution.
//!
//! This module provides a [`Processor`] that owns a piece of state and two
//! dedicated consumer threads. Any number of producer threads submit
//! closures; an ingress queue hands them to a forwarding thread, a
//! processing queue hands them to the execution thread, and the execution
//! thread is the only code that ever touches the state. This follows the
//! LMAX Disruptor pattern: bounded sequenced queues, per-slot publication,
//! and a single writer eliminating the need for locks.
//!
//! # Architecture
//!
//! - Producers claim a sequence in the ingress queue and publish a
//!   [`Command`]; a full queue blocks them via the queue's [`WaitStrategy`]
//! - The ingress thread forwards each command, in sequence order, into the
//!   processing queue
//! - The processing thread executes each task with exclusive access to the
//!   state, answers awaited submissions, and decrements the pending count
//! - [`PendingCounter`] makes `drain` a cheap barrier over everything
//!   accepted so far
//! - Shutdown closes the queues in stage order and joins both threads, so
//!   accepted work is never dropped
//!
//! # Examples
//!
//! ```
//! use storepipe_rs::pipeline::Processor;
//!
//! let processor = Processor::new(Vec::new());
//!
//! for i in 0..10u64 {
//!     processor.submit(move |log: &mut Vec<u64>| log.push(i))?;
//! }
//!
//! let len = processor.submit_and_await(|log| log.len())?;
//! assert_eq!(len, 10);
//!
//! processor.shutdown();
//! # Ok::<(), storepipe_rs::pipeline::PipelineError>(())
//! ```

pub mod command;
pub mod core;
pub mod pending;
pub mod ring;
mod slot;
pub mod stage;
pub mod wait;

#[cfg(test)]
mod tests;

// Re-export main types
pub use command::{Command, CommandFault, CommandOutcome, CommandTask};
pub use core::{DEFAULT_CAPACITY, PipelineConfig, PipelineError, Processor};
pub use pending::PendingCounter;
pub use stage::StageState;
pub use wait::{BlockingWaitStrategy, BusySpinWaitStrategy, WaitStrategy};
