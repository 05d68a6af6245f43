//! Network bring-up sequence.
//!
//! Runs once at boot, strictly in order:
//!
//! 1. check the radio answers, halt if not
//! 2. compare radio firmware against the known-latest version (warn only)
//! 3. join WiFi, blocking, retrying at a fixed interval
//! 4. start the TCP listener on the command port
//!
//! The actuator and touch ISR are wired by the caller afterwards; they are
//! hardware-only steps with nothing to decide.

use core::time::Duration;

use log::{error, info};

use crate::adapters::wifi::{JoinInfo, RetryPolicy, firmware_outdated};
use crate::config::{DeviceConfig, WifiCredentials};
use crate::error::{Error, Result};

use super::events::AppEvent;
use super::ports::{ConnectivityPort, EventSink, ListenerFactory};

/// What the caller does after [`bring_up`] fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// Park forever; nothing can work without the radio.
    Halt,
    /// Wait, then reboot and run the whole sequence again.
    RestartAfter(Duration),
}

/// Map a bring-up failure onto the boot policy.  Only a fatal error halts;
/// everything else (bad credentials, listener bind, exhausted retries) is
/// retried from a clean boot at the join retry interval.
pub fn recovery_for(err: &Error, config: &DeviceConfig) -> Recovery {
    if err.is_fatal() {
        Recovery::Halt
    } else {
        Recovery::RestartAfter(Duration::from_millis(u64::from(config.wifi_retry_interval_ms)))
    }
}

/// Everything the poll loop needs from the network side.
pub struct Network<L> {
    pub listener: L,
    pub join: JoinInfo,
}

/// Bring the network up.  Returns [`Error::ModuleNotFound`] before
/// touching anything else when the radio is absent; the caller must halt.
pub fn bring_up<W, F>(
    config: &DeviceConfig,
    credentials: &WifiCredentials,
    radio: &mut W,
    listener: F,
    sink: &mut impl EventSink,
    delay: &mut dyn FnMut(Duration),
) -> Result<Network<F::Listener>>
where
    W: ConnectivityPort,
    F: ListenerFactory,
{
    if !radio.module_present() {
        error!("Communication with WiFi module failed!");
        return Err(Error::ModuleNotFound);
    }

    let current = radio.firmware_version();
    info!("Radio firmware {}", current);
    if firmware_outdated(&current, &config.latest_radio_firmware) {
        sink.emit(&AppEvent::FirmwareOutdated {
            current,
            latest: config.latest_radio_firmware.clone(),
        });
    }

    config.validate().map_err(Error::Config)?;
    radio.set_credentials(&credentials.ssid, &credentials.password)?;

    let join = radio.connect(RetryPolicy::from_config(config), delay)?;
    sink.emit(&AppEvent::Joined {
        ip: join.ip,
        rssi: join.rssi,
        attempts: join.attempts,
    });

    let listener = listener.start(config.listen_port)?;
    sink.emit(&AppEvent::Listening {
        port: config.listen_port,
    });

    Ok(Network { listener, join })
}
