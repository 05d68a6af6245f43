//! ProbeLink Firmware: Main Entry Point
//!
//! Hexagonal architecture around a single cooperative poll loop plus one
//! GPIO interrupt.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  WifiAdapter        TcpCommandServer   ProbeActuator  LogSink  │
//! │  (Connectivity)     (Listener/Client)  (Actuator)     (Events) │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │   ProbeService (dispatch) · DeviceContext (latch)      │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                          ▲                                     │
//! │                touch ISR ┘ (latch + park)                      │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::time::Duration;

use anyhow::Result;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use log::{error, info, warn};

use probelink::adapters::log_sink::LogEventSink;
use probelink::adapters::tcp_server::TcpListenerFactory;
use probelink::adapters::wifi::WifiAdapter;
use probelink::app::bootstrap::{self, Recovery};
use probelink::app::context::DeviceContext;
use probelink::app::service::ProbeService;
use probelink::config::{DeviceConfig, WifiCredentials};
use probelink::drivers::hw_init;
use probelink::drivers::probe::ProbeActuator;

/// Sleep when a poll iteration found nothing to do, so the FreeRTOS idle
/// task (and its watchdog) gets to run.
const IDLE_POLL_DELAY: Duration = Duration::from_millis(1);

/// Permanent halt: the device does nothing until power-cycled.
fn halt() -> ! {
    loop {
        std::thread::sleep(Duration::from_secs(1));
    }
}

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap + diagnostic channel ─────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("ProbeLink v{}", env!("CARGO_PKG_VERSION"));

    let config = DeviceConfig::default();
    let credentials = WifiCredentials::from_build_env();
    let mut log_sink = LogEventSink::new();

    // ── 2-5. Radio check, firmware check, WiFi join, listener ─
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = match EspDefaultNvsPartition::take() {
        Ok(nvs) => Some(nvs),
        Err(e) => {
            warn!("NVS partition unavailable ({}), WiFi calibration will not persist", e);
            None
        }
    };
    let mut wifi = WifiAdapter::new(peripherals.modem, sysloop, nvs);

    let network = match bootstrap::bring_up(
        &config,
        &credentials,
        &mut wifi,
        TcpListenerFactory,
        &mut log_sink,
        &mut |interval| std::thread::sleep(interval),
    ) {
        Ok(network) => network,
        Err(e) => match bootstrap::recovery_for(&e, &config) {
            Recovery::Halt => {
                error!("Boot halted: {}", e);
                halt();
            }
            Recovery::RestartAfter(wait) => {
                error!("Boot failed: {}; restarting in {:?}", e, wait);
                std::thread::sleep(wait);
                esp_idf_svc::hal::reset::restart();
            }
        },
    };
    let mut listener = network.listener;

    // ── 6. Probe actuator ─────────────────────────────────────
    if let Err(e) = hw_init::init_servo_pwm() {
        warn!("Servo PWM init failed: {}, continuing, probe may not move", e);
    }
    let actuator = ProbeActuator::new(
        hw_init::servo_channel(),
        config.extend_angle_deg,
        config.neutral_angle_deg,
    );
    if let Err(e) = actuator.initialize() {
        warn!("Probe: initial park failed: {:?}", e);
    }

    // ── 7. Touch interrupt → latch ────────────────────────────
    let ctx = DeviceContext::new(actuator).leak();
    if let Err(e) = hw_init::bind_touch_interrupt(ctx) {
        error!("Touch ISR bind failed: {}; touch queries will always read 0", e);
    }

    let mut service = ProbeService::new(ctx);
    info!("Listening");

    // ── 8. Poll loop ──────────────────────────────────────────
    loop {
        if !service.poll(&mut listener, &mut log_sink) {
            std::thread::sleep(IDLE_POLL_DELAY);
        }
    }
}
