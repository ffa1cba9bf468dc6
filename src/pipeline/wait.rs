/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 25/8/26
******************************************************************************/

//! Wait strategies for queue producers and consumers.
//!
//! A [`WaitStrategy`] decides how a thread waits for a queue condition to
//! become true: parked on a condvar ([`BlockingWaitStrategy`]) or spinning
//! on the CPU ([`BusySpinWaitStrategy`]). Each queue owns one strategy,
//! shared by its producers (waiting for free capacity) and its consumer
//! (waiting for published slots).

use std::sync::{Condvar, Mutex, PoisonError};

/// How a thread waits for a queue condition.
///
/// Implementations must guarantee that `wait_until` returns only after
/// `ready()` has been observed `true`, and that a call to `notify` made
/// after `ready()` became `true` wakes every thread already blocked in
/// `wait_until`. The predicate must be pure enough to call repeatedly.
pub trait WaitStrategy: Send + Sync {
    /// Blocks the calling thread until `ready()` returns `true`.
    fn wait_until(&self, ready: &dyn Fn() -> bool);

    /// Wakes all threads currently blocked in [`WaitStrategy::wait_until`].
    ///
    /// Strategies that poll instead of parking implement this as a no-op.
    fn notify(&self);
}

/// Parks waiting threads on a condvar until notified.
///
/// Suited to queues whose producers may block for a while: a full queue
/// costs no CPU. This is the default strategy for the ingress queue.
#[derive(Debug, Default)]
pub struct BlockingWaitStrategy {
    lock: Mutex<()>,
    condvar: Condvar,
}

impl BlockingWaitStrategy {
    /// Creates a new blocking strategy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl WaitStrategy for BlockingWaitStrategy {
    fn wait_until(&self, ready: &dyn Fn() -> bool) {
        if ready() {
            return;
        }
        let mut guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        while !ready() {
            guard = self
                .condvar
                .wait(guard)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    fn notify(&self) {
        // The lock must be taken before notifying: a waiter between its
        // predicate re-check and parking would otherwise miss this wakeup.
        drop(self.lock.lock().unwrap_or_else(PoisonError::into_inner));
        self.condvar.notify_all();
    }
}

/// Spins on the CPU until the condition holds.
///
/// Lowest latency at the cost of a busy core. This is the default strategy
/// for the processing queue, whose consumer is expected to be hot.
#[derive(Debug, Default, Clone, Copy)]
pub struct BusySpinWaitStrategy;

impl BusySpinWaitStrategy {
    /// Creates a new busy-spin strategy.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl WaitStrategy for BusySpinWaitStrategy {
    fn wait_until(&self, ready: &dyn Fn() -> bool) {
        while !ready() {
            std::hint::spin_loop();
        }
    }

    fn notify(&self) {}
}
