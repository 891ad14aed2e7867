//! Interrupt-driven pending-event flag.
//!
//! The contact-sensing profile wakes early when the door switch changes
//! state.  The GPIO interrupt handler publishes a single "wake" bit; the
//! sequencer consumes it with an atomic test-and-clear.
//!
//! ```text
//! ┌─────────────┐  raise()   ┌──────────────┐  take()   ┌──────────────┐
//! │ Contact ISR │──────────▶│ PendingEvent │─────────▶│  Sequencer   │
//! │ (any edge)  │            │ (AtomicBool) │           │  (consumer)  │
//! └─────────────┘            └──────┬───────┘           └──────────────┘
//!                                   │ is_pending()
//!                                   ▼
//!                            SleepScheduler (early abort, no clear)
//! ```
//!
//! The flag is a boolean, not a counter: edges that arrive before the
//! sequencer takes the flag coalesce into one extra cycle.  Because the
//! sequencer clears it *before* handling, an edge during handling is kept
//! for the next iteration.

use core::sync::atomic::{AtomicBool, Ordering};

/// Single-producer / single-consumer wake slot.
#[derive(Debug)]
pub struct PendingEvent {
    pending: AtomicBool,
}

impl PendingEvent {
    pub const fn new() -> Self {
        Self {
            pending: AtomicBool::new(false),
        }
    }

    /// Mark an event as pending.  Lock-free; safe in interrupt context.
    pub fn raise(&self) {
        self.pending.store(true, Ordering::Release);
    }

    /// Read and clear in one step.  Returns whether an event was pending.
    pub fn take(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }

    /// Observe without consuming.
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }
}

impl Default for PendingEvent {
    fn default() -> Self {
        Self::new()
    }
}

/// Door/contact change flag, written only by [`contact_isr_handler`].
pub static CONTACT_EVENT: PendingEvent = PendingEvent::new();

/// ISR handler.  Register this on the contact GPIO (any edge).
///
/// Sets the flag and returns.  It must never log, allocate, block, or call
/// into acquisition or radio code.
#[inline]
pub fn contact_isr_handler() {
    CONTACT_EVENT.raise();
}
