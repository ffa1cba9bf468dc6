/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 25/8/26
******************************************************************************/

//! A single reusable cell of the sequenced ring.
//!
//! Each slot holds the value for whichever sequence currently maps to its
//! index, plus a marker recording which sequence was last published into it.
//! The marker stores `sequence + 1` so that zero means "never published" and
//! a stale marker from an earlier lap can never be mistaken for the current
//! sequence.

use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicU64, Ordering};

pub(crate) struct Slot<T> {
    value: UnsafeCell<Option<T>>,
    published: AtomicU64,
}

// The cell is only ever written by the producer holding the claim on the
// slot's current sequence and only read by the single consumer after the
// published marker for that sequence is visible.
unsafe impl<T: Send> Sync for Slot<T> {}

impl<T> Slot<T> {
    pub(crate) fn new() -> Self {
        Self {
            value: UnsafeCell::new(None),
            published: AtomicU64::new(0),
        }
    }

    /// Writes `value` into the cell and publishes it for `sequence`.
    ///
    /// The Release store of the marker orders the value write before any
    /// consumer that observes the marker.
    ///
    /// # Safety
    ///
    /// The caller must hold the exclusive claim on `sequence`, and the
    /// consumer must not yet have been lapped past this slot.
    pub(crate) unsafe fn publish(&self, sequence: u64, value: T) {
        unsafe {
            *self.value.get() = Some(value);
        }
        self.published.store(sequence + 1, Ordering::Release);
    }

    /// Returns `true` once the value published for `sequence` is visible.
    pub(crate) fn is_published(&self, sequence: u64) -> bool {
        self.published.load(Ordering::Acquire) == sequence + 1
    }

    /// Takes the value out of the cell.
    ///
    /// # Safety
    ///
    /// Only the single consumer may call this, and only after
    /// [`Slot::is_published`] returned `true` for the sequence it is
    /// consuming.
    pub(crate) unsafe fn take(&self) -> Option<T> {
        unsafe { (*self.value.get()).take() }
    }
}
