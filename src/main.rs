//! EnvNode Firmware — Main Entry Point
//!
//! Battery-powered environmental sensor node: wake, measure, transmit with
//! acknowledgement, sleep.  Optionally woken early by a door contact.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter      EspNowRadio   LightSleep   LogEventSink  │
//! │  (Sensor+Analog+Delay) (RadioPort)  (SleepPort)  (EventSink)   │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              NodeService (pure logic)                  │    │
//! │  │  Acquisition · Supply · Radio link · Sleep scheduler   │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Contact ISR ──▶ CONTACT_EVENT (atomic flag)                   │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use log::info;

use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::nvs::EspDefaultNvsPartition;

use envnode::adapters::board::Board;
use envnode::adapters::hardware::HardwareAdapter;
use envnode::adapters::log_sink::LogEventSink;
use envnode::adapters::radio::EspNowRadio;
use envnode::adapters::sleep::LightSleep;
use envnode::app::service::NodeService;
use envnode::config::NodeConfig;
use envnode::drivers::hw_init;
use envnode::events::CONTACT_EVENT;
use envnode::radio::record::Field;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  EnvNode v{}                         ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Build-time profile ─────────────────────────────────
    // ENVNODE_PROFILE (JSON) overrides the built-in default at compile time.
    let config = match option_env!("ENVNODE_PROFILE") {
        Some(json) => NodeConfig::from_json(json)?,
        None => {
            let config = NodeConfig::default();
            config.validate()?;
            config
        }
    };
    let contact = config.layout.has(Field::ContactState);

    // ── 3. Peripherals ────────────────────────────────────────
    hw_init::init_peripherals()?;
    if contact {
        hw_init::init_isr_service()?;
    }

    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;
    let radio = EspNowRadio::new(config.identity.group, peripherals.modem, sysloop, nvs)?;

    // ── 4. Adapters + service ─────────────────────────────────
    let event = contact.then_some(&CONTACT_EVENT);
    let mut board = Board::new(HardwareAdapter::new(), radio, LightSleep::new(event));
    let mut sink = LogEventSink::new();

    let mut service = NodeService::new(config)?;
    service.start(&mut sink);

    // ── 5. Duty cycle ─────────────────────────────────────────
    service.run_forever(&mut board, event, &mut sink)
}
