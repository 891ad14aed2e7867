//! ESP-NOW radio adapter.
//!
//! Implements [`RadioPort`] on the ESP32's 2.4 GHz radio.  Every frame is
//! broadcast as
//!
//! ```text
//! ┌───────┬────────┬──────────────────────────┐
//! │ group │ header │ payload (0..=MAX_PAYLOAD) │
//! └───────┴────────┴──────────────────────────┘
//! ```
//!
//! Frames from a different group are ignored.  ESP-NOW only delivers frames
//! whose frame check passed, so every accepted frame counts as `crc_ok`.
//!
//! The driver callbacks run in the WiFi task; they only touch atomics,
//! which the main loop drains through `poll_receive` / `send_wait`.
//!
//! - **`target_os = "espidf"`**: raw `esp_now_*` / `esp_wifi_*` calls.
//! - **all other targets**: a loopback gateway that acknowledges every
//!   frame that asks for it.

use core::sync::atomic::{AtomicBool, AtomicU16, Ordering};

use log::warn;

use crate::app::ports::{RadioPort, ReceivedFrame};
use crate::radio::record::MAX_PAYLOAD;

/// Group byte + header byte + record.
const MAX_FRAME: usize = MAX_PAYLOAD + 2;

/// Bit 8 marks the slot as holding an unread header in bits 0..8.
const RX_VALID: u16 = 0x100;

/// Last header received for our group, written by the receive callback.
static RX_SLOT: AtomicU16 = AtomicU16::new(0);
/// A frame is queued and the driver has not reported it sent yet.
static TX_BUSY: AtomicBool = AtomicBool::new(false);

fn take_rx() -> Option<u8> {
    let slot = RX_SLOT.swap(0, Ordering::AcqRel);
    (slot & RX_VALID != 0).then_some(slot as u8)
}

fn store_rx(header: u8) {
    RX_SLOT.store(RX_VALID | u16::from(header), Ordering::Release);
}

/// Frame a record for the air.  `None` if the payload does not fit.
pub fn build_frame(group: u8, header: u8, payload: &[u8]) -> Option<heapless::Vec<u8, MAX_FRAME>> {
    let mut frame = heapless::Vec::new();
    frame.push(group).ok()?;
    frame.push(header).ok()?;
    frame.extend_from_slice(payload).ok()?;
    Some(frame)
}

/// Header of a frame addressed to `group`, if any.
pub fn accept_frame(group: u8, data: &[u8]) -> Option<u8> {
    match data {
        [g, header, ..] if *g == group => Some(*header),
        _ => None,
    }
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF implementation
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
mod esp {
    use core::sync::atomic::{AtomicU8, Ordering};

    use esp_idf_svc::eventloop::EspSystemEventLoop;
    use esp_idf_svc::hal::modem::Modem;
    use esp_idf_svc::nvs::EspDefaultNvsPartition;
    use esp_idf_svc::sys::*;
    use esp_idf_svc::wifi::{ClientConfiguration, Configuration, EspWifi};
    use log::info;

    use super::{TX_BUSY, accept_frame, store_rx};
    use crate::error::HwInitError;
    use crate::pins;

    pub const BROADCAST: [u8; 6] = [0xFF; 6];

    /// Group filter for the receive callback.
    pub static GROUP: AtomicU8 = AtomicU8::new(0);

    unsafe extern "C" fn espnow_recv_cb(
        _info: *const esp_now_recv_info_t,
        data: *const u8,
        len: core::ffi::c_int,
    ) {
        if data.is_null() || len < 2 {
            return;
        }
        // SAFETY: the driver guarantees `data` is valid for `len` bytes for
        // the duration of the callback.
        let frame = unsafe { core::slice::from_raw_parts(data, len as usize) };
        if let Some(header) = accept_frame(GROUP.load(Ordering::Relaxed), frame) {
            store_rx(header);
        }
    }

    unsafe extern "C" fn espnow_send_cb(_mac: *const u8, _status: esp_now_send_status_t) {
        TX_BUSY.store(false, Ordering::Release);
    }

    fn radio_err(e: EspError) -> HwInitError {
        HwInitError::RadioInitFailed(e.code())
    }

    /// Bring up WiFi in station mode on the fixed channel and attach ESP-NOW.
    pub fn init(
        group: u8,
        modem: Modem,
        sysloop: EspSystemEventLoop,
        nvs: EspDefaultNvsPartition,
    ) -> Result<EspWifi<'static>, HwInitError> {
        GROUP.store(group, Ordering::Relaxed);

        let mut wifi = EspWifi::new(modem, sysloop, Some(nvs)).map_err(radio_err)?;
        wifi.set_configuration(&Configuration::Client(ClientConfiguration::default()))
            .map_err(radio_err)?;
        wifi.start().map_err(radio_err)?;

        // SAFETY: WiFi is started; these calls only configure the driver.
        unsafe {
            esp!(esp_wifi_set_channel(
                pins::RADIO_CHANNEL,
                wifi_second_chan_t_WIFI_SECOND_CHAN_NONE
            ))
            .map_err(radio_err)?;
            esp!(esp_now_init()).map_err(radio_err)?;
            esp!(esp_now_register_recv_cb(Some(espnow_recv_cb))).map_err(radio_err)?;
            esp!(esp_now_register_send_cb(Some(espnow_send_cb))).map_err(radio_err)?;

            let peer = esp_now_peer_info_t {
                peer_addr: BROADCAST,
                channel: pins::RADIO_CHANNEL,
                ifidx: wifi_interface_t_WIFI_IF_STA,
                encrypt: false,
                ..Default::default()
            };
            esp!(esp_now_add_peer(&peer)).map_err(radio_err)?;
            esp!(esp_wifi_stop()).map_err(radio_err)?;
        }

        info!("radio: ESP-NOW ready (group={} channel={})", group, pins::RADIO_CHANNEL);
        Ok(wifi)
    }
}

// ───────────────────────────────────────────────────────────────
// Adapter
// ───────────────────────────────────────────────────────────────

/// Longest wait for the driver's send-complete callback.
#[cfg(target_os = "espidf")]
const SEND_TIMEOUT_US: u32 = 20_000;

pub struct EspNowRadio {
    group: u8,
    awake: bool,
    #[cfg(target_os = "espidf")]
    _wifi: esp_idf_svc::wifi::EspWifi<'static>,
    #[cfg(not(target_os = "espidf"))]
    sim_acks: bool,
}

impl EspNowRadio {
    #[cfg(target_os = "espidf")]
    pub fn new(
        group: u8,
        modem: esp_idf_svc::hal::modem::Modem,
        sysloop: esp_idf_svc::eventloop::EspSystemEventLoop,
        nvs: esp_idf_svc::nvs::EspDefaultNvsPartition,
    ) -> crate::error::Result<Self> {
        let wifi = esp::init(group, modem, sysloop, nvs)?;
        Ok(Self {
            group,
            awake: false,
            _wifi: wifi,
        })
    }

    /// Simulated radio; `acks` controls whether the loopback gateway answers.
    #[cfg(not(target_os = "espidf"))]
    pub fn new(group: u8, acks: bool) -> Self {
        Self {
            group,
            awake: false,
            sim_acks: acks,
        }
    }

    pub fn is_awake(&self) -> bool {
        self.awake
    }
}

impl RadioPort for EspNowRadio {
    #[cfg(target_os = "espidf")]
    fn wake(&mut self) {
        use esp_idf_svc::sys::*;
        // SAFETY: driver initialised in esp::init; main task only.
        unsafe {
            if esp_wifi_start() != ESP_OK as i32 {
                warn!("radio: wake failed");
            }
            esp_wifi_set_channel(crate::pins::RADIO_CHANNEL, wifi_second_chan_t_WIFI_SECOND_CHAN_NONE);
        }
        self.awake = true;
    }

    #[cfg(not(target_os = "espidf"))]
    fn wake(&mut self) {
        self.awake = true;
    }

    #[cfg(target_os = "espidf")]
    fn sleep(&mut self) {
        // SAFETY: driver initialised in esp::init; main task only.
        unsafe {
            esp_idf_svc::sys::esp_wifi_stop();
        }
        TX_BUSY.store(false, Ordering::Release);
        self.awake = false;
    }

    #[cfg(not(target_os = "espidf"))]
    fn sleep(&mut self) {
        TX_BUSY.store(false, Ordering::Release);
        self.awake = false;
    }

    fn can_send(&mut self) -> bool {
        !TX_BUSY.load(Ordering::Acquire)
    }

    fn poll_receive(&mut self) -> Option<ReceivedFrame> {
        take_rx().map(|header| ReceivedFrame {
            header,
            crc_ok: true,
        })
    }

    fn send_start(&mut self, header: u8, payload: &[u8]) {
        let Some(frame) = build_frame(self.group, header, payload) else {
            warn!("radio: {} byte payload does not fit a frame", payload.len());
            return;
        };
        // Stale acks from an earlier attempt must not satisfy this one.
        let _ = take_rx();
        TX_BUSY.store(true, Ordering::Release);
        self.transmit(&frame);
    }

    #[cfg(target_os = "espidf")]
    fn send_wait(&mut self) {
        let mut waited_us = 0;
        while TX_BUSY.load(Ordering::Acquire) {
            if waited_us >= SEND_TIMEOUT_US {
                warn!("radio: send-complete callback missing");
                TX_BUSY.store(false, Ordering::Release);
                return;
            }
            // SAFETY: ROM busy-wait.
            unsafe { esp_idf_svc::sys::esp_rom_delay_us(50) };
            waited_us += 50;
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn send_wait(&mut self) {}
}

impl EspNowRadio {
    #[cfg(target_os = "espidf")]
    fn transmit(&mut self, frame: &[u8]) {
        // SAFETY: the broadcast peer was registered in esp::init and `frame`
        // outlives the call (ESP-NOW copies it).
        let ret = unsafe { esp_idf_svc::sys::esp_now_send(esp::BROADCAST.as_ptr(), frame.as_ptr(), frame.len()) };
        if ret != esp_idf_svc::sys::ESP_OK as i32 {
            warn!("radio: esp_now_send failed (rc={})", ret);
            TX_BUSY.store(false, Ordering::Release);
        }
    }

    /// Loopback gateway: completes immediately and acknowledges frames
    /// that request it.
    #[cfg(not(target_os = "espidf"))]
    fn transmit(&mut self, frame: &[u8]) {
        use crate::radio::header;

        TX_BUSY.store(false, Ordering::Release);
        if let Some(hdr) = accept_frame(self.group, frame) {
            if self.sim_acks && hdr & header::ACK != 0 {
                store_rx(header::DST | header::CTL | header::node_of(hdr));
            }
        }
    }
}
