//! Probe touch latch.
//!
//! The probe's trigger line raises a GPIO interrupt when the pin contacts a
//! surface.  The ISR sets the latch; the main loop reads and clears it when
//! a client asks.  Any number of touches between two queries collapse into
//! a single `true`.
//!
//! The ISR and the main loop share the flag without a lock, so it is an
//! `AtomicBool`.  Reading and clearing happen in one `swap`, which means a
//! touch landing during a query is never lost: it is either reported by
//! this query or left set for the next one.

use core::sync::atomic::{AtomicBool, Ordering};

/// Single-bit "a touch happened" latch.
#[derive(Debug, Default)]
pub struct TouchLatch {
    touched: AtomicBool,
}

impl TouchLatch {
    pub const fn new() -> Self {
        Self {
            touched: AtomicBool::new(false),
        }
    }

    /// Record a touch.  ISR-safe: one atomic store, no allocation.
    pub fn signal(&self) {
        self.touched.store(true, Ordering::Release);
    }

    /// Return whether a touch was recorded since the last query, and clear
    /// the latch.  Main-loop only.
    pub fn query_and_clear(&self) -> bool {
        self.touched.swap(false, Ordering::AcqRel)
    }

    /// Peek without clearing (diagnostics only).
    pub fn is_set(&self) -> bool {
        self.touched.load(Ordering::Acquire)
    }
}
