//! The whole node board behind one value.
//!
//! [`NodeService`](crate::app::service::NodeService) drives a single
//! `&mut impl NodeHardware`; `Board` satisfies it by delegating each port to
//! the adapter that owns the peripheral.

use embedded_hal::delay::DelayNs;

use crate::app::ports::{
    AnalogPort, HumidityReading, RadioPort, ReceivedFrame, SensorChannel, SensorPort, SleepPort,
};
use crate::error::SensorReadError;

use super::hardware::HardwareAdapter;
use super::radio::EspNowRadio;
use super::sleep::LightSleep;

pub struct Board {
    pub hw: HardwareAdapter,
    pub radio: EspNowRadio,
    pub sleep: LightSleep,
}

impl Board {
    pub fn new(hw: HardwareAdapter, radio: EspNowRadio, sleep: LightSleep) -> Self {
        Self { hw, radio, sleep }
    }
}

impl SensorPort for Board {
    fn set_sensor_power(&mut self, on: bool) {
        self.hw.set_sensor_power(on);
    }

    fn park_data_pin(&mut self) {
        self.hw.park_data_pin();
    }

    fn read_humidity(&mut self, channel: SensorChannel) -> Result<HumidityReading, SensorReadError> {
        self.hw.read_humidity(channel)
    }

    fn contact_closed(&mut self) -> bool {
        self.hw.contact_closed()
    }
}

impl AnalogPort for Board {
    fn adc_enable(&mut self) {
        self.hw.adc_enable();
    }

    fn adc_disable(&mut self) {
        self.hw.adc_disable();
    }

    fn read_reference(&mut self) -> u16 {
        self.hw.read_reference()
    }

    fn read_battery(&mut self) -> u16 {
        self.hw.read_battery()
    }
}

impl RadioPort for Board {
    fn wake(&mut self) {
        self.radio.wake();
    }

    fn sleep(&mut self) {
        self.radio.sleep();
    }

    fn can_send(&mut self) -> bool {
        self.radio.can_send()
    }

    fn poll_receive(&mut self) -> Option<ReceivedFrame> {
        self.radio.poll_receive()
    }

    fn send_start(&mut self, header: u8, payload: &[u8]) {
        self.radio.send_start(header, payload);
    }

    fn send_wait(&mut self) {
        self.radio.send_wait();
    }
}

impl SleepPort for Board {
    fn sleep_chunk(&mut self, ms: u32) {
        self.sleep.sleep_chunk(ms);
    }
}

impl DelayNs for Board {
    fn delay_ns(&mut self, ns: u32) {
        self.hw.delay_ns(ns);
    }

    fn delay_us(&mut self, us: u32) {
        self.hw.delay_us(us);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.hw.delay_ms(ms);
    }
}
