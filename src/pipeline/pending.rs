/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 25/8/26
******************************************************************************/

//! In-flight command accounting.
//!
//! [`PendingCounter`] tracks how many commands have been accepted by the
//! pipeline but not yet fully processed. The count is incremented before a
//! command becomes visible to the first stage and decremented only after its
//! completion has been signalled, so a zero count means every accepted
//! command has finished. [`PendingCounter::wait_zero`] turns that into a
//! drain barrier without burning a core.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Condvar, Mutex, PoisonError};

/// Counter of accepted-but-unfinished commands with a blocking zero barrier.
#[derive(Debug, Default)]
pub struct PendingCounter {
    count: AtomicU64,
    lock: Mutex<()>,
    zero: Condvar,
}

impl PendingCounter {
    /// Creates a counter at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one more command in flight.
    pub fn increment(&self) {
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    /// Records one command finished, waking barrier waiters on the last one.
    pub fn decrement(&self) {
        let previous = self.count.fetch_sub(1, Ordering::AcqRel);
        debug_assert!(previous > 0, "pending counter underflow");
        if previous == 1 {
            // Lock ordering with `wait_zero`: a waiter between its re-check
            // and parking holds the lock, so this wakeup cannot be lost.
            drop(self.lock.lock().unwrap_or_else(PoisonError::into_inner));
            self.zero.notify_all();
        }
    }

    /// Current number of commands in flight.
    #[must_use]
    pub fn get(&self) -> u64 {
        self.count.load(Ordering::Acquire)
    }

    /// Blocks until the count reaches zero.
    ///
    /// Commands submitted while this call is blocked extend the wait; the
    /// barrier is over whatever is in flight when zero is finally observed.
    pub fn wait_zero(&self) {
        if self.count.load(Ordering::Acquire) == 0 {
            return;
        }
        let mut guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        while self.count.load(Ordering::Acquire) != 0 {
            guard = self
                .zero
                .wait(guard)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}
