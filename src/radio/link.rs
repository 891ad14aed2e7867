//! Reliable radio delivery: bounded acknowledge-and-retry.
//!
//! ```text
//!  IDLE ─▶ WAKING ─▶ SENDING ─▶ AWAITING_ACK ──ack──▶ DONE (delivered)
//!                                    │
//!                                 timeout
//!                                    ▼
//!                    attempts left? ─yes─▶ backoff sleep ─▶ WAKING
//!                                    │
//!                                    no ─▶ DONE (dropped)
//! ```
//!
//! The radio is put back to sleep after *every* attempt via [`RadioAwake`].
//! An undelivered record is dropped without escalation or local storage;
//! the next cycle carries fresh data anyway.

use core::ops::{Deref, DerefMut};

use embedded_hal::delay::DelayNs;
use log::{debug, info, warn};

use crate::app::ports::{RadioPort, SleepPort};
use crate::config::{NodeId, RadioConfig};
use crate::radio::header;

/// Result of one [`ReliableRadioLink::send`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendOutcome {
    /// Acknowledged (or, with acks disabled, handed to the transmitter).
    pub delivered: bool,
    /// Transmissions performed, first attempt included.
    pub attempts: u32,
}

// ───────────────────────────────────────────────────────────────
// Scoped radio power
// ───────────────────────────────────────────────────────────────

/// Radio held awake for the lifetime of the guard; asleep again on drop.
pub struct RadioAwake<'a, H: RadioPort> {
    hw: &'a mut H,
}

impl<'a, H: RadioPort> RadioAwake<'a, H> {
    pub fn wake(hw: &'a mut H) -> Self {
        hw.wake();
        Self { hw }
    }
}

impl<H: RadioPort> Deref for RadioAwake<'_, H> {
    type Target = H;

    fn deref(&self) -> &H {
        self.hw
    }
}

impl<H: RadioPort> DerefMut for RadioAwake<'_, H> {
    fn deref_mut(&mut self) -> &mut H {
        self.hw
    }
}

impl<H: RadioPort> Drop for RadioAwake<'_, H> {
    fn drop(&mut self) {
        self.hw.sleep();
    }
}

// ───────────────────────────────────────────────────────────────
// Link
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct ReliableRadioLink {
    node: NodeId,
    config: RadioConfig,
}

impl ReliableRadioLink {
    pub fn new(node: NodeId, config: RadioConfig) -> Self {
        Self { node, config }
    }

    /// Total transmissions allowed per record.
    pub fn max_attempts(&self) -> u32 {
        if self.config.ack_enabled {
            u32::from(self.config.retry_limit) + 1
        } else {
            1
        }
    }

    /// Deliver `payload`, retrying until acknowledged or out of attempts.
    pub fn send<H>(&self, hw: &mut H, payload: &[u8]) -> SendOutcome
    where
        H: RadioPort + SleepPort + DelayNs,
    {
        if !self.config.ack_enabled {
            let mut radio = RadioAwake::wake(hw);
            self.transmit(&mut *radio, payload, false);
            debug!("radio: best-effort send of {} bytes", payload.len());
            return SendOutcome {
                delivered: true,
                attempts: 1,
            };
        }

        let max_attempts = self.max_attempts();
        for attempt in 1..=max_attempts {
            let acked = {
                let mut radio = RadioAwake::wake(hw);
                self.transmit(&mut *radio, payload, true);
                self.wait_for_ack(&mut *radio)
            };

            if acked {
                info!("radio: acked on attempt {}/{}", attempt, max_attempts);
                return SendOutcome {
                    delivered: true,
                    attempts: attempt,
                };
            }

            debug!("radio: no ack on attempt {}/{}", attempt, max_attempts);
            if attempt < max_attempts {
                hw.sleep_chunk(self.config.retry_backoff_ms);
            }
        }

        warn!("radio: giving up after {} attempts, record dropped", max_attempts);
        SendOutcome {
            delivered: false,
            attempts: max_attempts,
        }
    }

    /// Wait for the transmitter, queue the frame, wait until it is out.
    fn transmit<H: RadioPort>(&self, hw: &mut H, payload: &[u8], ack_requested: bool) {
        // The driver only makes progress while being polled.
        while !hw.can_send() {
            let _ = hw.poll_receive();
        }
        hw.send_start(header::data_header(self.node, ack_requested), payload);
        hw.send_wait();
    }

    /// Listen for `ack_window_ms`; only an intact frame addressed to this
    /// node with the control bits set counts.
    fn wait_for_ack<H: RadioPort + DelayNs>(&self, hw: &mut H) -> bool {
        let expected = header::ack_header(self.node);
        let step_us = self.config.ack_poll_interval_us.max(1);
        let window_us = self.config.ack_window_ms.saturating_mul(1000);
        let polls = window_us.div_ceil(step_us).max(1);

        for _ in 0..polls {
            if let Some(frame) = hw.poll_receive() {
                if frame.crc_ok && frame.header == expected {
                    return true;
                }
                debug!(
                    "radio: ignoring frame hdr=0x{:02X} crc_ok={}",
                    frame.header, frame.crc_ok
                );
            }
            hw.delay_us(step_us);
        }
        false
    }
}
