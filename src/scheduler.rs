//! Duty-cycle sleep scheduler.
//!
//! The hardware sleep primitive caps a single suspension (60 s on the
//! reference board), so a 5- or 30-minute interval is built from repeated
//! chunks.  Between chunks the scheduler looks at the pending-event flag and
//! gives up the rest of the interval if it is set.
//!
//! ```text
//!  sleep_for(300 s, Some(&CONTACT_EVENT))
//!
//!  ├── 60 s ──┼── 60 s ──┼── 60 s ──┼── 60 s ──┼── 60 s ──┤  Completed
//!  ├── 60 s ──┼── 60 s ─╳┤                                  Interrupted
//!                       ↑ edge: observed at the end of this chunk at the latest
//! ```
//!
//! Time accounting counts every chunk as fully slept.  This is not a
//! precision timer; early wakes from the sleep primitive only shorten the
//! real interval.

use log::debug;

use crate::app::ports::SleepPort;
use crate::events::PendingEvent;

/// How a [`SleepScheduler::sleep_for`] call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SleepOutcome {
    /// The whole interval elapsed.
    Completed { slept_ms: u64 },
    /// The pending-event flag cut the interval short.
    Interrupted { slept_ms: u64 },
}

impl SleepOutcome {
    pub fn was_interrupted(self) -> bool {
        matches!(self, Self::Interrupted { .. })
    }

    pub fn slept_ms(self) -> u64 {
        match self {
            Self::Completed { slept_ms } | Self::Interrupted { slept_ms } => slept_ms,
        }
    }
}

/// Chunked sleep with optional early abort.
#[derive(Debug, Clone, Copy)]
pub struct SleepScheduler {
    max_chunk_ms: u32,
}

impl SleepScheduler {
    /// `max_chunk_ms` must be non-zero (enforced by config validation).
    pub fn new(max_chunk_ms: u32) -> Self {
        Self {
            max_chunk_ms: max_chunk_ms.max(1),
        }
    }

    pub fn max_chunk_ms(&self) -> u32 {
        self.max_chunk_ms
    }

    /// Suspend for `total_ms`, or until `event` is pending.
    ///
    /// The flag is only observed, never cleared; the sequencer owns clearing.
    pub fn sleep_for(
        &self,
        hw: &mut impl SleepPort,
        total_ms: u64,
        event: Option<&PendingEvent>,
    ) -> SleepOutcome {
        let pending = || event.is_some_and(PendingEvent::is_pending);
        let mut slept_ms: u64 = 0;

        while slept_ms < total_ms {
            if pending() {
                debug!("sleep: interrupted after {} of {} ms", slept_ms, total_ms);
                return SleepOutcome::Interrupted { slept_ms };
            }
            let chunk = (total_ms - slept_ms).min(u64::from(self.max_chunk_ms)) as u32;
            hw.sleep_chunk(chunk);
            slept_ms += u64::from(chunk);
        }

        // An event that landed in the final chunk still counts as early:
        // the caller must start a new cycle instead of another full sleep.
        if total_ms > 0 && pending() {
            return SleepOutcome::Interrupted { slept_ms };
        }
        SleepOutcome::Completed { slept_ms }
    }
}
