/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 25/8/26
******************************************************************************/

//! Stage threads: each queue is drained by one dedicated consumer thread.
//!
//! A [`Stage`] owns the consumer side of a queue and a named OS thread that
//! loops taking the next value in sequence order, handing it to the stage
//! handler, and releasing the slot. The loop exits once the queue is closed
//! and drained, so joining a stage after closing its queue guarantees every
//! accepted value was handled.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;

use super::ring::RingConsumer;

/// Lifecycle of a stage's consumer thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageState {
    /// Accepting and processing work.
    Running,
    /// Shutdown has begun; queued work is still being finished.
    Draining,
    /// The consumer thread has exited.
    Stopped,
}

impl StageState {
    const fn as_u8(self) -> u8 {
        match self {
            Self::Running => 0,
            Self::Draining => 1,
            Self::Stopped => 2,
        }
    }

    const fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Draining,
            2 => Self::Stopped,
            _ => Self::Running,
        }
    }
}

pub(crate) struct Stage {
    name: &'static str,
    state: Arc<AtomicU8>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Stage {
    /// Spawns a named consumer thread draining `consumer` through `handler`.
    pub(crate) fn spawn<T, F>(
        name: &'static str,
        mut consumer: RingConsumer<T>,
        mut handler: F,
    ) -> Self
    where
        T: Send + 'static,
        F: FnMut(u64, T) + Send + 'static,
    {
        let state = Arc::new(AtomicU8::new(StageState::Running.as_u8()));
        let thread_state = Arc::clone(&state);

        let handle = std::thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                tracing::debug!(stage = name, "consumer thread started");
                while let Some((sequence, item)) = consumer.consume_next() {
                    handler(sequence, item);
                    consumer.release(sequence);
                }
                thread_state.store(StageState::Stopped.as_u8(), Ordering::SeqCst);
                tracing::debug!(stage = name, "consumer thread stopped");
            })
            .expect("failed to spawn stage thread");

        Self {
            name,
            state,
            handle: Mutex::new(Some(handle)),
        }
    }

    pub(crate) fn state(&self) -> StageState {
        StageState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Marks the stage as draining unless it already stopped.
    pub(crate) fn begin_drain(&self) {
        let _ = self.state.compare_exchange(
            StageState::Running.as_u8(),
            StageState::Draining.as_u8(),
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
    }

    /// Joins the consumer thread. Idempotent; concurrent callers serialize
    /// on the handle lock, so whoever returns first has seen the join done.
    pub(crate) fn join(&self) {
        let mut guard = self.handle.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = guard.take() {
            if handle.join().is_err() {
                tracing::error!(stage = self.name, "stage thread panicked");
            }
            self.state.store(StageState::Stopped.as_u8(), Ordering::SeqCst);
        }
    }
}

/// Renders a panic payload into a loggable message.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
