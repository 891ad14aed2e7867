//! Sensor rail and ADC power scoping against the scripted board.

use crate::mock_hw::{Call, ScriptedNode, reading};

use envnode::app::ports::SensorChannel;
use envnode::config::{DividerConfig, SensorConfig, SupplyMethod};
use envnode::error::SensorReadError;
use envnode::sensors::acquisition::{Acquisition, SensorAcquisition, SensorReading, SensorRetryPolicy};
use envnode::sensors::supply::SupplyMonitor;

#[test]
fn rail_is_powered_for_warmup_and_parked_after() {
    let mut hw = ScriptedNode::new();
    let acq = SensorAcquisition::new(&SensorConfig::default());

    let out = acq.acquire(&mut hw, SensorChannel::Primary);

    assert_eq!(
        out,
        Acquisition::Success {
            reading: SensorReading {
                temperature: 2150,
                humidity: 4860
            },
            attempts: 1
        }
    );
    assert_eq!(
        hw.calls,
        vec![
            Call::SensorPower(true),
            Call::ReadHumidity(SensorChannel::Primary),
            Call::SensorPower(false),
            Call::ParkDataPin,
        ]
    );
    assert_eq!(hw.now_ms(), 2000, "warm-up before the first poll");
    assert!(!hw.sensor_powered);
}

#[test]
fn failures_are_retried_with_backoff_until_success() {
    let mut hw = ScriptedNode::new();
    hw.script_primary([
        Err(SensorReadError::NotReady),
        Err(SensorReadError::Checksum),
        Err(SensorReadError::Timeout),
        Ok(reading(-3.4, 65.2)),
    ]);
    let acq = SensorAcquisition::new(&SensorConfig::default());

    let out = acq.acquire(&mut hw, SensorChannel::Primary);

    assert_eq!(out.attempts(), 4);
    assert_eq!(
        out.reading(),
        Some(SensorReading {
            temperature: -340,
            humidity: 6519
        })
    );
    assert_eq!(hw.now_ms(), 2000 + 3 * 250);
    assert_eq!(hw.count(&Call::SensorPower(true)), 1, "rail stays on across retries");
}

#[test]
fn dead_sensor_times_out_at_the_deadline() {
    let mut hw = ScriptedNode::new();
    hw.fallback_reading = None;
    let acq = SensorAcquisition::new(&SensorConfig::default());

    let out = acq.acquire(&mut hw, SensorChannel::Primary);

    // 10 s budget / 250 ms backoff = 40 waits, then the 41st poll gives up.
    assert_eq!(out, Acquisition::Timeout { attempts: 41 });
    assert_eq!(hw.now_ms(), 2000 + 10_000);
    assert!(!hw.sensor_powered);
    assert_eq!(hw.calls.last(), Some(&Call::ParkDataPin));
}

#[test]
fn unbounded_policy_keeps_polling() {
    let mut hw = ScriptedNode::new();
    hw.script_primary((0..200).map(|_| Err(SensorReadError::NotReady)));
    let cfg = SensorConfig {
        retry: SensorRetryPolicy::Unbounded,
        ..SensorConfig::default()
    };

    let out = SensorAcquisition::new(&cfg).acquire(&mut hw, SensorChannel::Secondary);

    assert_eq!(out.attempts(), 201);
    assert!(out.reading().is_some());
}

#[test]
fn divider_measurement_brackets_adc_power() {
    let mut hw = ScriptedNode::new();
    hw.battery_raw = 512;
    let monitor = SupplyMonitor::new(SupplyMethod::DividerAverage(DividerConfig::default()));

    let r = monitor.measure(&mut hw);

    assert_eq!(r.millivolts, 3303);
    assert_eq!(r.percent, Some(2526));
    assert_eq!(hw.calls.first(), Some(&Call::AdcEnable));
    assert_eq!(hw.calls.last(), Some(&Call::AdcDisable));
    assert_eq!(hw.count(&Call::ReadBattery), 5);
    assert_eq!(hw.now_ms(), 4 * 10);
    assert!(!hw.adc_on);
}

#[test]
fn reference_measurement_is_a_single_conversion() {
    let mut hw = ScriptedNode::new();
    hw.reference_raw = 341;
    let monitor = SupplyMonitor::new(SupplyMethod::ReferenceRatio {
        reference_constant: 1_126_400,
    });

    let r = monitor.measure(&mut hw);

    assert_eq!(r.millivolts, 3303);
    assert_eq!(r.percent, None);
    assert_eq!(hw.calls, vec![Call::AdcEnable, Call::ReadReference, Call::AdcDisable]);
}
