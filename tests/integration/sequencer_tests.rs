//! Full duty-cycle iterations: measure → transmit → sleep, with and without
//! contact events.

use crate::mock_hw::{Call, CollectingSink, ScriptedNode, reading};

use envnode::app::events::AppEvent;
use envnode::app::ports::SensorChannel;
use envnode::app::service::{NodeService, NodeStats};
use envnode::config::{DEFAULT_REFERENCE_CONSTANT, NodeConfig, RadioConfig, SupplyMethod};
use envnode::error::{ConfigError, SensorReadError};
use envnode::events::PendingEvent;
use envnode::radio::record::{MISSING_READING, MeasurementRecord, RecordLayout};
use envnode::scheduler::SleepOutcome;

const INTERVAL_MS: u64 = 300_000;

fn event() -> &'static PendingEvent {
    Box::leak(Box::new(PendingEvent::new()))
}

fn reference_config(layout: RecordLayout) -> NodeConfig {
    NodeConfig {
        layout,
        supply: SupplyMethod::ReferenceRatio {
            reference_constant: DEFAULT_REFERENCE_CONSTANT,
        },
        ..NodeConfig::default()
    }
}

fn service(config: NodeConfig) -> NodeService {
    NodeService::new(config).unwrap()
}

// ── Scheduled cycles ──────────────────────────────────────────

#[test]
fn scheduled_cycle_sends_full_record_then_sleeps_interval() {
    let mut svc = service(NodeConfig::default());
    let mut hw = ScriptedNode::new();
    let mut sink = CollectingSink::new();

    let report = svc.run_iteration(&mut hw, None, &mut sink);

    assert!(!report.triggered);
    assert!(report.cycle.outcome.delivered);
    assert_eq!(report.sleep, SleepOutcome::Completed { slept_ms: INTERVAL_MS });
    assert_eq!(hw.sleep_chunks(), vec![60_000; 5]);

    // 21.50 °C, 48.60 %, 3303 mV, 25.26 %
    let expected = [0x66, 0x08, 0xFC, 0x12, 0xE7, 0x0C, 0xDE, 0x09];
    assert_eq!(hw.sends(), vec![(0x20 | 17, expected.to_vec())]);

    let decoded = MeasurementRecord::decode(RecordLayout::Battery, &expected).unwrap();
    assert_eq!(&decoded, svc.record());
    assert!(hw.all_off());
}

#[test]
fn record_is_complete_before_the_radio_wakes() {
    let mut svc = service(NodeConfig::default());
    let mut hw = ScriptedNode::new();
    let mut sink = CollectingSink::new();

    svc.run_iteration(&mut hw, None, &mut sink);

    let sensor_off = hw.position(&Call::SensorPower(false)).unwrap();
    let adc_off = hw.position(&Call::AdcDisable).unwrap();
    let wake = hw.position(&Call::RadioWake).unwrap();
    let first_sleep = hw.position(&Call::SleepChunk(60_000)).unwrap();
    assert!(sensor_off < adc_off && adc_off < wake && wake < first_sleep);
}

#[test]
fn events_describe_the_cycle_in_order() {
    let mut svc = service(NodeConfig::default());
    let mut hw = ScriptedNode::new();
    let mut sink = CollectingSink::new();

    svc.run_iteration(&mut hw, None, &mut sink);

    assert!(matches!(
        sink.events[0],
        AppEvent::CycleStarted {
            cycle: 1,
            triggered: false
        }
    ));
    assert!(matches!(sink.events[1], AppEvent::Measured(_)));
    assert!(matches!(sink.events[2], AppEvent::Delivered { attempts: 1 }));
    assert_eq!(sink.events.len(), 3);
}

#[test]
fn timed_out_sensor_is_sent_as_missing() {
    let mut svc = service(reference_config(RecordLayout::Basic));
    let mut hw = ScriptedNode::new();
    hw.fallback_reading = None;
    let mut sink = CollectingSink::new();

    let report = svc.run_iteration(&mut hw, None, &mut sink);

    assert_eq!(report.cycle.record.temperature, MISSING_READING);
    assert_eq!(report.cycle.record.humidity, MISSING_READING);
    assert_eq!(report.cycle.record.supply_voltage, 3303);
    assert_eq!(hw.sends()[0].1, vec![0x00, 0x80, 0x00, 0x80, 0xE7, 0x0C]);
    assert_eq!(
        sink.count(|e| matches!(
            e,
            AppEvent::SensorTimeout {
                channel: SensorChannel::Primary,
                ..
            }
        )),
        1
    );
    assert_eq!(svc.stats().sensor_timeouts, 1);
}

#[test]
fn dual_layout_reads_both_sensors() {
    let mut svc = service(reference_config(RecordLayout::Dual));
    let mut hw = ScriptedNode::new();
    hw.script_secondary([Err(SensorReadError::Checksum), Ok(reading(-3.4, 65.2))]);
    let mut sink = CollectingSink::new();

    let report = svc.run_iteration(&mut hw, None, &mut sink);

    let r = report.cycle.record;
    assert_eq!((r.temperature, r.humidity), (2150, 4860));
    assert_eq!((r.secondary_temperature, r.secondary_humidity), (-340, 6519), "scaled by truncation");
    let payload = &hw.sends()[0].1;
    assert_eq!(payload.len(), 10);
    assert_eq!(&payload[8..], &[0xE7, 0x0C], "supply voltage is last");
    assert_eq!(hw.count(&Call::SensorPower(true)), 2);
}

#[test]
fn contact_layout_samples_door_state() {
    let mut svc = service(reference_config(RecordLayout::Contact));
    let mut hw = ScriptedNode::new();
    hw.contact_closed = true;
    let mut sink = CollectingSink::new();

    let report = svc.run_iteration(&mut hw, None, &mut sink);

    assert_eq!(report.cycle.record.contact_state, 1);
    assert_eq!(&hw.sends()[0].1[6..], &[0x01, 0x00]);

    hw.contact_closed = false;
    let report = svc.run_iteration(&mut hw, None, &mut sink);
    assert_eq!(report.cycle.record.contact_state, 0);
}

#[test]
fn undelivered_record_is_dropped_and_next_cycle_proceeds() {
    let mut svc = service(NodeConfig::default());
    let mut hw = ScriptedNode::new();
    hw.script_acks([false; 6]);
    let mut sink = CollectingSink::new();

    let first = svc.run_iteration(&mut hw, None, &mut sink);
    let second = svc.run_iteration(&mut hw, None, &mut sink);

    assert!(!first.cycle.outcome.delivered);
    assert_eq!(first.cycle.outcome.attempts, 6);
    assert!(second.cycle.outcome.delivered);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::Dropped { attempts: 6 })), 1);
    assert_eq!(
        svc.stats(),
        NodeStats {
            cycles: 2,
            triggered_cycles: 0,
            delivered: 1,
            dropped: 1,
            radio_attempts: 7,
            sensor_timeouts: 0,
        }
    );
}

#[test]
fn best_effort_mode_reports_sent() {
    let config = NodeConfig {
        radio: RadioConfig {
            ack_enabled: false,
            ..RadioConfig::default()
        },
        ..NodeConfig::default()
    };
    let mut svc = service(config);
    let mut hw = ScriptedNode::new();
    let mut sink = CollectingSink::new();

    svc.run_iteration(&mut hw, None, &mut sink);

    assert_eq!(hw.sends()[0].0, 17);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::Sent)), 1);
    assert_eq!(svc.stats().delivered, 0);
}

#[test]
fn invalid_config_is_rejected() {
    let config = NodeConfig {
        cycle_interval_secs: 0,
        ..NodeConfig::default()
    };
    assert!(matches!(
        NodeService::new(config),
        Err(ConfigError::ValidationFailed(_))
    ));
}

// ── Contact events ────────────────────────────────────────────

#[test]
fn event_during_sleep_cuts_it_short_and_triggers_next_cycle() {
    let ev = event();
    let mut svc = service(reference_config(RecordLayout::Contact));
    let mut hw = ScriptedNode::new();
    let mut chunks = 0;
    hw.on_call(move |c| {
        if let Call::SleepChunk(_) = c {
            chunks += 1;
            if chunks == 2 {
                ev.raise();
            }
        }
    });
    let mut sink = CollectingSink::new();

    let first = svc.run_iteration(&mut hw, Some(ev), &mut sink);
    assert!(!first.triggered);
    assert_eq!(first.sleep, SleepOutcome::Interrupted { slept_ms: 120_000 });
    assert!(ev.is_pending(), "the scheduler never clears the flag");

    let second = svc.run_iteration(&mut hw, Some(ev), &mut sink);
    assert!(second.triggered);
    assert_eq!(second.sleep, SleepOutcome::Completed { slept_ms: INTERVAL_MS });
    assert!(!ev.is_pending());

    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::SleepInterrupted { slept_ms: 120_000 })),
        1
    );
    assert_eq!(svc.stats().triggered_cycles, 1);
}

#[test]
fn event_during_a_cycle_is_not_lost() {
    let ev = event();
    let mut svc = service(reference_config(RecordLayout::Contact));
    let mut hw = ScriptedNode::new();
    let mut raised = false;
    hw.on_call(move |c| {
        if matches!(c, Call::Send { .. }) && !raised {
            raised = true;
            ev.raise();
        }
    });
    let mut sink = CollectingSink::new();

    let first = svc.run_iteration(&mut hw, Some(ev), &mut sink);
    assert_eq!(first.sleep, SleepOutcome::Interrupted { slept_ms: 0 });
    assert!(hw.sleep_chunks().is_empty());

    let second = svc.run_iteration(&mut hw, Some(ev), &mut sink);
    assert!(second.triggered);
    assert!(!second.sleep.was_interrupted());
}

#[test]
fn edges_before_the_flag_is_taken_coalesce() {
    let ev = event();
    let mut svc = service(reference_config(RecordLayout::Contact));
    let mut hw = ScriptedNode::new();
    let mut armed = true;
    hw.on_call(move |c| {
        if !armed {
            return;
        }
        match c {
            Call::ReadHumidity(_) | Call::AdcEnable => ev.raise(),
            Call::Send { .. } => {
                ev.raise();
                armed = false;
            }
            _ => {}
        }
    });
    let mut sink = CollectingSink::new();

    let reports: Vec<_> = (0..3)
        .map(|_| svc.run_iteration(&mut hw, Some(ev), &mut sink))
        .collect();

    let triggered: Vec<bool> = reports.iter().map(|r| r.triggered).collect();
    assert_eq!(triggered, vec![false, true, false], "three edges, one extra cycle");
    assert_eq!(svc.stats().cycles, 3);
    assert_eq!(svc.stats().triggered_cycles, 1);
}

#[test]
fn flag_raised_before_start_triggers_the_first_cycle() {
    let ev = event();
    ev.raise();
    let mut svc = service(reference_config(RecordLayout::Contact));
    let mut hw = ScriptedNode::new();
    let mut sink = CollectingSink::new();

    let report = svc.run_iteration(&mut hw, Some(ev), &mut sink);

    assert!(report.triggered);
    assert_eq!(report.sleep, SleepOutcome::Completed { slept_ms: INTERVAL_MS });
}

#[test]
fn without_an_event_source_sleep_is_never_cut_short() {
    let ev = event();
    let mut svc = service(NodeConfig::default());
    let mut hw = ScriptedNode::new();
    hw.on_call(move |c| {
        if let Call::SleepChunk(_) = c {
            ev.raise();
        }
    });
    let mut sink = CollectingSink::new();

    let report = svc.run_iteration(&mut hw, None, &mut sink);

    assert_eq!(report.sleep, SleepOutcome::Completed { slept_ms: INTERVAL_MS });
    assert!(ev.is_pending(), "untouched by a node without contact input");
}
