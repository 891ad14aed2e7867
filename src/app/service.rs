//! Node service — the duty-cycle sequencer.
//!
//! [`NodeService`] owns the record and the configured components and runs
//! the operating cycle against any hardware that satisfies the port traits.
//!
//! ```text
//!        ┌──────────────────────────────────────────────────────────┐
//!        │ take(flag) ─▶ acquire ─▶ supply ─▶ encode ─▶ send ─▶ sleep │──┐
//!        └──────────────────────────────────────────────────────────┘  │
//!              ▲                                  (aborts early if     │
//!              └────────────────────────────────── flag set)  ◀────────┘
//! ```
//!
//! The pending-event flag is cleared *before* the cycle runs, so an edge
//! that arrives while measuring or transmitting is not lost: it interrupts
//! the following sleep and triggers the next iteration immediately.

use embedded_hal::delay::DelayNs;
use log::{info, warn};

use crate::config::NodeConfig;
use crate::error::ConfigError;
use crate::events::PendingEvent;
use crate::radio::link::{ReliableRadioLink, SendOutcome};
use crate::radio::record::{Field, MISSING_READING, MeasurementRecord};
use crate::scheduler::{SleepOutcome, SleepScheduler};
use crate::sensors::acquisition::{Acquisition, SensorAcquisition};
use crate::sensors::contact::sample_contact;
use crate::sensors::supply::SupplyMonitor;

use super::events::AppEvent;
use super::ports::{AnalogPort, EventSink, RadioPort, SensorChannel, SensorPort, SleepPort};

/// Everything a full cycle touches.  Blanket-implemented, so any adapter
/// (or mock) implementing the individual ports qualifies.
pub trait NodeHardware: SensorPort + AnalogPort + RadioPort + SleepPort + DelayNs {}

impl<T> NodeHardware for T where T: SensorPort + AnalogPort + RadioPort + SleepPort + DelayNs {}

/// Running counters since boot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeStats {
    pub cycles: u64,
    pub triggered_cycles: u64,
    pub delivered: u64,
    pub dropped: u64,
    pub radio_attempts: u64,
    pub sensor_timeouts: u64,
}

/// What one measure-and-transmit cycle produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub record: MeasurementRecord,
    pub outcome: SendOutcome,
}

/// What one loop iteration (cycle + sleep) produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IterationReport {
    pub triggered: bool,
    pub cycle: CycleReport,
    pub sleep: SleepOutcome,
}

pub struct NodeService {
    config: NodeConfig,
    acquisition: SensorAcquisition,
    supply: SupplyMonitor,
    link: ReliableRadioLink,
    scheduler: SleepScheduler,
    record: MeasurementRecord,
    stats: NodeStats,
}

impl NodeService {
    /// Build the service.  The configuration must validate.
    pub fn new(config: NodeConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            acquisition: SensorAcquisition::new(&config.sensor),
            supply: SupplyMonitor::new(config.supply),
            link: ReliableRadioLink::new(config.identity.node_id, config.radio),
            scheduler: SleepScheduler::new(config.max_sleep_chunk_ms),
            record: MeasurementRecord::default(),
            stats: NodeStats::default(),
            config,
        })
    }

    pub fn start(&self, sink: &mut impl EventSink) {
        let id = &self.config.identity;
        info!(
            "NodeService started: node={} group={} band={:?} layout={:?}",
            id.node_id.get(),
            id.group,
            id.band,
            self.config.layout
        );
        sink.emit(&AppEvent::Started {
            node_id: id.node_id.get(),
            group: id.group,
            layout: self.config.layout,
        });
    }

    // ── Per-cycle orchestration ───────────────────────────────

    /// Measure everything the layout needs, then transmit the record once
    /// (with retries).  `triggered` only tags the cycle for reporting.
    pub fn run_cycle(
        &mut self,
        hw: &mut impl NodeHardware,
        triggered: bool,
        sink: &mut impl EventSink,
    ) -> CycleReport {
        self.stats.cycles += 1;
        if triggered {
            self.stats.triggered_cycles += 1;
        }
        sink.emit(&AppEvent::CycleStarted {
            cycle: self.stats.cycles,
            triggered,
        });

        let layout = self.config.layout;

        // 1. Humidity / temperature
        let (t, h) = self.acquire(hw, SensorChannel::Primary, sink);
        self.record.temperature = t;
        self.record.humidity = h;

        if layout.has(Field::SecondaryTemperature) {
            let (t2, h2) = self.acquire(hw, SensorChannel::Secondary, sink);
            self.record.secondary_temperature = t2;
            self.record.secondary_humidity = h2;
        }

        // 2. Door / contact level
        if layout.has(Field::ContactState) {
            self.record.contact_state = sample_contact(hw);
        }

        // 3. Supply
        let supply = self.supply.measure(hw);
        self.record.supply_voltage = supply.millivolts;
        if let Some(percent) = supply.percent {
            self.record.supply_percent = percent;
        }

        // 4. Transmit the fully populated record
        sink.emit(&AppEvent::Measured(self.record));
        let payload = self.record.encode(layout);
        let outcome = self.link.send(hw, &payload);

        self.stats.radio_attempts += u64::from(outcome.attempts);
        if !self.config.radio.ack_enabled {
            sink.emit(&AppEvent::Sent);
        } else if outcome.delivered {
            self.stats.delivered += 1;
            sink.emit(&AppEvent::Delivered {
                attempts: outcome.attempts,
            });
        } else {
            self.stats.dropped += 1;
            sink.emit(&AppEvent::Dropped {
                attempts: outcome.attempts,
            });
        }

        CycleReport {
            record: self.record,
            outcome,
        }
    }

    /// One pass of the main loop: consume the flag, run a cycle, sleep the
    /// configured interval unless the flag is raised again meanwhile.
    pub fn run_iteration(
        &mut self,
        hw: &mut impl NodeHardware,
        event: Option<&PendingEvent>,
        sink: &mut impl EventSink,
    ) -> IterationReport {
        // Clear before handling: an edge during the cycle stays pending.
        let triggered = event.is_some_and(PendingEvent::take);

        let cycle = self.run_cycle(hw, triggered, sink);

        let sleep = self
            .scheduler
            .sleep_for(hw, self.config.cycle_interval_ms(), event);
        if let SleepOutcome::Interrupted { slept_ms } = sleep {
            info!("Woken early after {} ms by contact event", slept_ms);
            sink.emit(&AppEvent::SleepInterrupted { slept_ms });
        }

        IterationReport {
            triggered,
            cycle,
            sleep,
        }
    }

    /// The firmware main loop.  Never returns.
    pub fn run_forever(
        &mut self,
        hw: &mut impl NodeHardware,
        event: Option<&PendingEvent>,
        sink: &mut impl EventSink,
    ) -> ! {
        loop {
            self.run_iteration(hw, event, sink);
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// The record as last populated.
    pub fn record(&self) -> &MeasurementRecord {
        &self.record
    }

    pub fn stats(&self) -> NodeStats {
        self.stats
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    // ── Internal ──────────────────────────────────────────────

    fn acquire(
        &mut self,
        hw: &mut impl NodeHardware,
        channel: SensorChannel,
        sink: &mut impl EventSink,
    ) -> (i16, i16) {
        match self.acquisition.acquire(hw, channel) {
            Acquisition::Success { reading, .. } => (reading.temperature, reading.humidity),
            Acquisition::Timeout { attempts } => {
                warn!("{:?} sensor timed out; sending missing-reading sentinel", channel);
                self.stats.sensor_timeouts += 1;
                sink.emit(&AppEvent::SensorTimeout { channel, attempts });
                (MISSING_READING, MISSING_READING)
            }
        }
    }
}
