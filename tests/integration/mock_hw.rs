//! Scripted mock of the whole node board for integration tests.
//!
//! Implements every port the [`NodeService`] drives.  Each call is recorded
//! so tests can assert on the full history, and all waits advance a
//! virtual clock instead of blocking.  Power discipline is checked on the
//! spot: sending with the radio asleep, reading a powered-down sensor or
//! sleeping with anything left on panics.
//!
//! [`NodeService`]: envnode::app::service::NodeService

use std::collections::VecDeque;

use embedded_hal::delay::DelayNs;
use envnode::app::events::AppEvent;
use envnode::app::ports::{
    AnalogPort, EventSink, HumidityReading, RadioPort, ReceivedFrame, SensorChannel, SensorPort,
    SleepPort,
};
use envnode::error::SensorReadError;
use envnode::radio::header;

// ── Call record ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    SensorPower(bool),
    ParkDataPin,
    ReadHumidity(SensorChannel),
    ReadContact,
    AdcEnable,
    AdcDisable,
    ReadReference,
    ReadBattery,
    RadioWake,
    RadioSleep,
    Send { header: u8, payload: Vec<u8> },
    SleepChunk(u32),
}

type Hook = Box<dyn FnMut(&Call)>;

// ── ScriptedNode ──────────────────────────────────────────────

pub struct ScriptedNode {
    pub calls: Vec<Call>,
    /// Virtual time in nanoseconds.
    pub now_ns: u64,

    primary: VecDeque<Result<HumidityReading, SensorReadError>>,
    secondary: VecDeque<Result<HumidityReading, SensorReadError>>,
    /// Answer once the scripted queue is empty; `None` keeps failing.
    pub fallback_reading: Option<HumidityReading>,

    pub reference_raw: u16,
    pub battery_raw: u16,
    pub contact_closed: bool,

    ack_plan: VecDeque<bool>,
    /// Whether a data frame asking for an ack gets one once the plan is used up.
    pub ack_default: bool,
    /// Frames delivered before the genuine ack (wrong node, bad CRC, …).
    noise: VecDeque<ReceivedFrame>,
    rx: VecDeque<ReceivedFrame>,

    pub sensor_powered: bool,
    pub adc_on: bool,
    pub radio_awake: bool,

    hook: Option<Hook>,
}

#[allow(dead_code)]
impl ScriptedNode {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            now_ns: 0,
            primary: VecDeque::new(),
            secondary: VecDeque::new(),
            fallback_reading: Some(reading(21.5, 48.6)),
            reference_raw: 341,
            battery_raw: 512,
            contact_closed: false,
            ack_plan: VecDeque::new(),
            ack_default: true,
            noise: VecDeque::new(),
            rx: VecDeque::new(),
            sensor_powered: false,
            adc_on: false,
            radio_awake: false,
            hook: None,
        }
    }

    // ── Scripting ─────────────────────────────────────────────

    pub fn script_primary(&mut self, results: impl IntoIterator<Item = Result<HumidityReading, SensorReadError>>) {
        self.primary.extend(results);
    }

    pub fn script_secondary(&mut self, results: impl IntoIterator<Item = Result<HumidityReading, SensorReadError>>) {
        self.secondary.extend(results);
    }

    /// One entry per acked transmission, in order: `true` = answered.
    pub fn script_acks(&mut self, plan: impl IntoIterator<Item = bool>) {
        self.ack_plan.extend(plan);
    }

    pub fn inject_noise(&mut self, frame: ReceivedFrame) {
        self.noise.push_back(frame);
    }

    /// Run `hook` after every recorded call (e.g. to raise an event mid-cycle).
    pub fn on_call(&mut self, hook: impl FnMut(&Call) + 'static) {
        self.hook = Some(Box::new(hook));
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn now_ms(&self) -> u64 {
        self.now_ns / 1_000_000
    }

    pub fn sends(&self) -> Vec<(u8, Vec<u8>)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Send { header, payload } => Some((*header, payload.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn sleep_chunks(&self) -> Vec<u32> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::SleepChunk(ms) => Some(*ms),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }

    pub fn position(&self, call: &Call) -> Option<usize> {
        self.calls.iter().position(|c| c == call)
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    pub fn all_off(&self) -> bool {
        !self.sensor_powered && !self.adc_on && !self.radio_awake
    }

    fn record(&mut self, call: Call) {
        if let Some(hook) = self.hook.as_mut() {
            hook(&call);
        }
        self.calls.push(call);
    }
}

impl Default for ScriptedNode {
    fn default() -> Self {
        Self::new()
    }
}

pub fn reading(temperature_c: f32, humidity_pct: f32) -> HumidityReading {
    HumidityReading {
        temperature_c,
        humidity_pct,
    }
}

// ── Port implementations ──────────────────────────────────────

impl SensorPort for ScriptedNode {
    fn set_sensor_power(&mut self, on: bool) {
        self.sensor_powered = on;
        self.record(Call::SensorPower(on));
    }

    fn park_data_pin(&mut self) {
        self.record(Call::ParkDataPin);
    }

    fn read_humidity(&mut self, channel: SensorChannel) -> Result<HumidityReading, SensorReadError> {
        assert!(self.sensor_powered, "sensor polled with the rail off");
        self.record(Call::ReadHumidity(channel));
        let queue = match channel {
            SensorChannel::Primary => &mut self.primary,
            SensorChannel::Secondary => &mut self.secondary,
        };
        match queue.pop_front() {
            Some(result) => result,
            None => self.fallback_reading.ok_or(SensorReadError::NotReady),
        }
    }

    fn contact_closed(&mut self) -> bool {
        self.record(Call::ReadContact);
        self.contact_closed
    }
}

impl AnalogPort for ScriptedNode {
    fn adc_enable(&mut self) {
        self.adc_on = true;
        self.record(Call::AdcEnable);
    }

    fn adc_disable(&mut self) {
        self.adc_on = false;
        self.record(Call::AdcDisable);
    }

    fn read_reference(&mut self) -> u16 {
        assert!(self.adc_on, "reference read with the ADC off");
        self.record(Call::ReadReference);
        self.reference_raw
    }

    fn read_battery(&mut self) -> u16 {
        assert!(self.adc_on, "battery read with the ADC off");
        self.record(Call::ReadBattery);
        self.battery_raw
    }
}

impl RadioPort for ScriptedNode {
    fn wake(&mut self) {
        self.radio_awake = true;
        self.record(Call::RadioWake);
    }

    fn sleep(&mut self) {
        self.radio_awake = false;
        self.rx.clear();
        self.record(Call::RadioSleep);
    }

    fn can_send(&mut self) -> bool {
        true
    }

    fn poll_receive(&mut self) -> Option<ReceivedFrame> {
        self.rx.pop_front()
    }

    fn send_start(&mut self, hdr: u8, payload: &[u8]) {
        assert!(self.radio_awake, "send with the radio asleep");
        self.record(Call::Send {
            header: hdr,
            payload: payload.to_vec(),
        });
        if hdr & header::ACK != 0 {
            self.rx.extend(self.noise.drain(..));
            let answered = self.ack_plan.pop_front().unwrap_or(self.ack_default);
            if answered {
                self.rx.push_back(ReceivedFrame {
                    header: header::DST | header::CTL | header::node_of(hdr),
                    crc_ok: true,
                });
            }
        }
    }

    fn send_wait(&mut self) {}
}

impl SleepPort for ScriptedNode {
    fn sleep_chunk(&mut self, ms: u32) {
        assert!(
            self.all_off(),
            "sleeping with power on: sensor={} adc={} radio={}",
            self.sensor_powered,
            self.adc_on,
            self.radio_awake
        );
        self.record(Call::SleepChunk(ms));
        self.now_ns += u64::from(ms) * 1_000_000;
    }
}

impl DelayNs for ScriptedNode {
    fn delay_ns(&mut self, ns: u32) {
        self.now_ns += u64::from(ns);
    }
}

// ── Event capture ─────────────────────────────────────────────

#[derive(Default)]
pub struct CollectingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for CollectingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
