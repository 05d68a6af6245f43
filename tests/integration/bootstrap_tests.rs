//! Integration tests for the boot-time network bring-up.
//!
//! Uses the host-simulated radio from the WiFi adapter and a mock listener
//! factory that records whether the command port was ever opened.

use std::cell::Cell;
use std::time::Duration;

use crate::mock_hw::{MockListenerFactory, RecordingSink};

use probelink::adapters::tcp_server::ListenerError;
use probelink::adapters::wifi::{ConnectivityError, WifiAdapter, WifiState};
use probelink::app::bootstrap::{self, Recovery};
use probelink::app::events::AppEvent;
use probelink::config::{DeviceConfig, WifiCredentials};
use probelink::error::Error;

fn creds() -> WifiCredentials {
    WifiCredentials::new("Workshop", "password1")
}

// ── Missing radio ─────────────────────────────────────────────

#[test]
fn missing_module_halts_before_anything_else() {
    let config = DeviceConfig::default();
    let mut radio = WifiAdapter::simulated(false, 0, "1.0.0");
    let started = Cell::new(None);
    let mut sink = RecordingSink::new();
    let mut waits = 0;

    let result = bootstrap::bring_up(
        &config,
        &creds(),
        &mut radio,
        MockListenerFactory { started_on: &started, fail: false },
        &mut sink,
        &mut |_| waits += 1,
    );

    let err = result.err().unwrap();
    assert_eq!(err, Error::ModuleNotFound);
    assert!(err.is_fatal());
    assert_eq!(started.get(), None, "listener must never start");
    assert_eq!(waits, 0, "no join attempt without a radio");
    assert!(sink.events.is_empty(), "firmware check is skipped too");
}

// ── Happy path ────────────────────────────────────────────────

#[test]
fn joins_and_listens_on_command_port() {
    let config = DeviceConfig::default();
    let mut radio = WifiAdapter::simulated(true, 0, "5.2.1");
    let started = Cell::new(None);
    let mut sink = RecordingSink::new();

    let network = bootstrap::bring_up(
        &config,
        &creds(),
        &mut radio,
        MockListenerFactory { started_on: &started, fail: false },
        &mut sink,
        &mut |_| {},
    )
    .unwrap();

    assert_eq!(started.get(), Some(9988));
    assert_eq!(network.join.attempts, 1);
    assert_eq!(radio.state(), WifiState::Connected);
    assert_eq!(
        sink.events.last(),
        Some(&AppEvent::Listening { port: 9988 })
    );
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::FirmwareOutdated { .. })),
        0
    );
    assert!(matches!(sink.events[0], AppEvent::Joined { attempts: 1, .. }));
}

#[test]
fn retries_every_ten_seconds_until_joined() {
    let config = DeviceConfig::default();
    let mut radio = WifiAdapter::simulated(true, 2, "5.2.1");
    let started = Cell::new(None);
    let mut sink = RecordingSink::new();
    let mut waits = Vec::new();

    let network = bootstrap::bring_up(
        &config,
        &creds(),
        &mut radio,
        MockListenerFactory { started_on: &started, fail: false },
        &mut sink,
        &mut |d| waits.push(d),
    )
    .unwrap();

    assert_eq!(network.join.attempts, 3);
    assert_eq!(waits, vec![Duration::from_secs(10); 2]);
    assert_eq!(started.get(), Some(9988));
}

// ── Firmware check ────────────────────────────────────────────

#[test]
fn outdated_firmware_warns_but_continues() {
    let config = DeviceConfig::default();
    let mut radio = WifiAdapter::simulated(true, 0, "v4.4.7");
    let started = Cell::new(None);
    let mut sink = RecordingSink::new();

    bootstrap::bring_up(
        &config,
        &creds(),
        &mut radio,
        MockListenerFactory { started_on: &started, fail: false },
        &mut sink,
        &mut |_| {},
    )
    .unwrap();

    match &sink.events[0] {
        AppEvent::FirmwareOutdated { current, latest } => {
            assert_eq!(current.as_str(), "v4.4.7");
            assert_eq!(latest.as_str(), "5.2.0");
        }
        other => panic!("expected FirmwareOutdated first, got {:?}", other),
    }
    assert_eq!(started.get(), Some(9988));
}

// ── Failure paths ─────────────────────────────────────────────

#[test]
fn invalid_credentials_stop_before_joining() {
    let config = DeviceConfig::default();
    let mut radio = WifiAdapter::simulated(true, 0, "5.2.1");
    let started = Cell::new(None);
    let mut sink = RecordingSink::new();

    let err = bootstrap::bring_up(
        &config,
        &WifiCredentials::new("", ""),
        &mut radio,
        MockListenerFactory { started_on: &started, fail: false },
        &mut sink,
        &mut |_| {},
    )
    .err()
    .unwrap();

    assert_eq!(err, Error::Comms(ConnectivityError::InvalidSsid));
    assert!(!err.is_fatal());
    assert_eq!(radio.state(), WifiState::Disconnected);
    assert_eq!(started.get(), None);
}

#[test]
fn bounded_retry_gives_up() {
    let config = DeviceConfig {
        wifi_max_attempts: Some(3),
        ..DeviceConfig::default()
    };
    let mut radio = WifiAdapter::simulated(true, 100, "5.2.1");
    let started = Cell::new(None);
    let mut sink = RecordingSink::new();
    let mut waits = 0;

    let err = bootstrap::bring_up(
        &config,
        &creds(),
        &mut radio,
        MockListenerFactory { started_on: &started, fail: false },
        &mut sink,
        &mut |_| waits += 1,
    )
    .err()
    .unwrap();

    assert_eq!(err, Error::Comms(ConnectivityError::RetriesExhausted));
    assert_eq!(waits, 2, "no wait after the final attempt");
    assert_eq!(started.get(), None);
}

#[test]
fn listener_failure_is_reported() {
    let config = DeviceConfig::default();
    let mut radio = WifiAdapter::simulated(true, 0, "5.2.1");
    let started = Cell::new(None);
    let mut sink = RecordingSink::new();

    let err = bootstrap::bring_up(
        &config,
        &creds(),
        &mut radio,
        MockListenerFactory { started_on: &started, fail: true },
        &mut sink,
        &mut |_| {},
    )
    .err()
    .unwrap();

    assert_eq!(err, Error::Listener(ListenerError::Bind));
    assert_eq!(radio.state(), WifiState::Connected, "join happens before the listener");
}

#[test]
fn invalid_config_is_rejected() {
    let config = DeviceConfig {
        listen_port: 0,
        ..DeviceConfig::default()
    };
    let mut radio = WifiAdapter::simulated(true, 0, "5.2.1");
    let started = Cell::new(None);
    let mut sink = RecordingSink::new();

    let err = bootstrap::bring_up(
        &config,
        &creds(),
        &mut radio,
        MockListenerFactory { started_on: &started, fail: false },
        &mut sink,
        &mut |_| {},
    )
    .err()
    .unwrap();

    assert!(matches!(err, Error::Config(_)));
    assert_eq!(radio.state(), WifiState::Disconnected);
}

// ── Boot recovery policy ──────────────────────────────────────

#[test]
fn missing_module_is_the_only_halt() {
    let config = DeviceConfig::default();
    assert_eq!(bootstrap::recovery_for(&Error::ModuleNotFound, &config), Recovery::Halt);

    let retry = Recovery::RestartAfter(Duration::from_secs(10));
    for err in [
        Error::Comms(ConnectivityError::InvalidSsid),
        Error::Comms(ConnectivityError::RetriesExhausted),
        Error::Listener(ListenerError::Bind),
        Error::Config("listen_port must be non-zero"),
    ] {
        assert_eq!(bootstrap::recovery_for(&err, &config), retry, "{:?}", err);
    }
}

#[test]
fn failed_bring_up_maps_to_restart_at_retry_interval() {
    let config = DeviceConfig {
        wifi_retry_interval_ms: 2_500,
        ..DeviceConfig::default()
    };
    let mut radio = WifiAdapter::simulated(true, 0, "5.2.1");
    let started = Cell::new(None);
    let mut sink = RecordingSink::new();

    let err = bootstrap::bring_up(
        &config,
        &creds(),
        &mut radio,
        MockListenerFactory { started_on: &started, fail: true },
        &mut sink,
        &mut |_| {},
    )
    .err()
    .unwrap();

    assert_eq!(
        bootstrap::recovery_for(&err, &config),
        Recovery::RestartAfter(Duration::from_millis(2_500))
    );
}
