/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 25/8/26
******************************************************************************/

//! Bounded multi-producer, single-consumer sequenced queue.
//!
//! Producers claim strictly increasing sequence numbers, write their value
//! into the slot the sequence maps to, and publish it. The single consumer
//! takes values in exact sequence order, so the queue never reorders and
//! never drops a published value. Capacity is fixed at construction: a claim
//! for sequence `n` cannot succeed until sequence `n - capacity` has been
//! released, which is the only backpressure mechanism.
//!
//! Two cursors drive the queue. `claimed` is the next sequence a producer
//! may take; `consumed` is the next sequence the consumer will read. The
//! invariants `consumed <= claimed` and `claimed - consumed <= capacity`
//! hold at all times. Closing the queue sets the top bit of the `claimed`
//! cursor, which atomically fails every in-progress claim race: a sequence
//! claimed before the close is always visible to the consumer, a claim
//! attempted after it always returns [`QueueClosed`].

use crossbeam::utils::CachePadded;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::slot::Slot;
use super::wait::WaitStrategy;

const CLOSED_BIT: u64 = 1 << 63;
const SEQUENCE_MASK: u64 = CLOSED_BIT - 1;

/// Error returned by [`RingProducer::claim`] once the queue is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueClosed;

impl std::fmt::Display for QueueClosed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "queue is closed to new claims")
    }
}

impl std::error::Error for QueueClosed {}

struct RingCore<T> {
    slots: Box<[Slot<T>]>,
    mask: u64,
    capacity: u64,

    /// Next sequence to hand to a producer. The top bit is the closed flag.
    claimed: CachePadded<AtomicU64>,

    /// Next sequence the consumer will take.
    consumed: CachePadded<AtomicU64>,

    wait: Arc<dyn WaitStrategy>,
}

impl<T> RingCore<T> {
    fn is_closed(&self) -> bool {
        self.claimed.load(Ordering::Acquire) & CLOSED_BIT != 0
    }

    fn is_drained(&self) -> bool {
        let claimed = self.claimed.load(Ordering::Acquire);
        claimed & CLOSED_BIT != 0
            && claimed & SEQUENCE_MASK == self.consumed.load(Ordering::Acquire)
    }
}

/// Creates a bounded sequenced queue with the given wait strategy.
///
/// `capacity` is rounded up to the next power of two. The producer handle
/// is cheap to clone and share across threads; the consumer handle is
/// unique.
///
/// # Panics
///
/// Panics if `capacity` is zero.
#[must_use]
pub fn bounded<T: Send>(
    capacity: usize,
    wait: Arc<dyn WaitStrategy>,
) -> (RingProducer<T>, RingConsumer<T>) {
    assert!(capacity > 0, "queue capacity must be non-zero");
    let capacity = capacity.next_power_of_two() as u64;
    let slots: Box<[Slot<T>]> = (0..capacity).map(|_| Slot::new()).collect();

    let core = Arc::new(RingCore {
        slots,
        mask: capacity - 1,
        capacity,
        claimed: CachePadded::new(AtomicU64::new(0)),
        consumed: CachePadded::new(AtomicU64::new(0)),
        wait,
    });

    (
        RingProducer { core: Arc::clone(&core) },
        RingConsumer { core },
    )
}

/// Producer side of a sequenced queue. Clone freely across threads.
pub struct RingProducer<T> {
    core: Arc<RingCore<T>>,
}

impl<T> Clone for RingProducer<T> {
    fn clone(&self) -> Self {
        Self { core: Arc::clone(&self.core) }
    }
}

impl<T: Send> RingProducer<T> {
    /// Claims the next sequence number, blocking while the queue is full.
    ///
    /// Every successful claim must be followed by a [`RingProducer::publish`]
    /// for the same sequence; the consumer waits for it.
    ///
    /// # Errors
    ///
    /// Returns [`QueueClosed`] once the queue has been closed. A close while
    /// this call is blocked on a full queue wakes it and fails it.
    pub fn claim(&self) -> Result<u64, QueueClosed> {
        let core = &*self.core;
        loop {
            let claimed = core.claimed.load(Ordering::Relaxed);
            if claimed & CLOSED_BIT != 0 {
                return Err(QueueClosed);
            }
            if claimed - core.consumed.load(Ordering::Acquire) >= core.capacity {
                core.wait.wait_until(&|| {
                    let now = core.claimed.load(Ordering::Relaxed);
                    now & CLOSED_BIT != 0
                        || now - core.consumed.load(Ordering::Acquire) < core.capacity
                });
                continue;
            }
            match core.claimed.compare_exchange_weak(
                claimed,
                claimed + 1,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return Ok(claimed),
                Err(_) => std::hint::spin_loop(),
            }
        }
    }

    /// Publishes `value` under a previously claimed `sequence`.
    pub fn publish(&self, sequence: u64, value: T) {
        let core = &*self.core;
        let slot = &core.slots[(sequence & core.mask) as usize];
        // SAFETY: `sequence` came from `claim` on this queue exactly once,
        // and the capacity bound in `claim` guarantees the consumer has
        // released the slot's previous occupant.
        unsafe { slot.publish(sequence, value) };
        core.wait.notify();
    }

    /// Closes the queue to new claims. Idempotent.
    ///
    /// Sequences already claimed may still be published and will be consumed;
    /// only future claims fail.
    pub fn close(&self) {
        self.core.claimed.fetch_or(CLOSED_BIT, Ordering::SeqCst);
        self.core.wait.notify();
    }

    /// Returns `true` once the queue no longer accepts claims.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.core.is_closed()
    }

    /// Number of sequences claimed but not yet released by the consumer.
    #[must_use]
    pub fn in_flight(&self) -> u64 {
        let core = &*self.core;
        let consumed = core.consumed.load(Ordering::Acquire);
        (core.claimed.load(Ordering::Acquire) & SEQUENCE_MASK) - consumed
    }

    /// The fixed slot count of the queue.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.core.capacity as usize
    }
}

/// Consumer side of a sequenced queue. Exactly one exists per queue.
pub struct RingConsumer<T> {
    core: Arc<RingCore<T>>,
}

impl<T: Send> RingConsumer<T> {
    /// Blocks for the next published value, in strict sequence order.
    ///
    /// Returns `None` once the queue is closed and every claimed sequence
    /// has been consumed. A sequence claimed but not yet published keeps
    /// this call waiting: accepted values are never skipped.
    pub fn consume_next(&mut self) -> Option<(u64, T)> {
        let core = &*self.core;
        let sequence = core.consumed.load(Ordering::Relaxed);
        let slot = &core.slots[(sequence & core.mask) as usize];

        core.wait
            .wait_until(&|| slot.is_published(sequence) || core.is_drained());

        if slot.is_published(sequence) {
            // SAFETY: unique consumer, and the published marker for
            // `sequence` has been observed.
            let value = unsafe { slot.take() };
            value.map(|v| (sequence, v))
        } else {
            None
        }
    }

    /// Releases `sequence`, freeing its slot for a future claim.
    ///
    /// Must be called with the sequence most recently returned by
    /// [`RingConsumer::consume_next`].
    pub fn release(&mut self, sequence: u64) {
        self.core.consumed.store(sequence + 1, Ordering::Release);
        self.core.wait.notify();
    }

    /// Returns `true` once the queue is closed and fully consumed.
    #[must_use]
    pub fn is_drained(&self) -> bool {
        self.core.is_drained()
    }
}
