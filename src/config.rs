//! Device configuration parameters
//!
//! All tunable parameters for the probe bridge.  Nothing here is persisted;
//! values are fixed at build time and read once during bootstrap.

use serde::{Deserialize, Serialize};

/// Core device configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceConfig {
    // --- Network ---
    /// TCP port the command listener binds to
    pub listen_port: u16,
    /// Delay between WiFi join attempts (milliseconds)
    pub wifi_retry_interval_ms: u32,
    /// Give up after this many join attempts (`None` = retry forever)
    pub wifi_max_attempts: Option<u32>,

    // --- Probe ---
    /// Servo angle that deploys the probe pin (degrees)
    pub extend_angle_deg: u8,
    /// Servo angle that stows the probe pin (degrees)
    pub neutral_angle_deg: u8,

    // --- Diagnostics ---
    /// Oldest radio firmware that does not trigger an upgrade warning
    pub latest_radio_firmware: heapless::String<16>,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        let mut latest_radio_firmware = heapless::String::new();
        // "5.2.0" always fits in 16 bytes.
        let _ = latest_radio_firmware.push_str("5.2.0");

        Self {
            // Network
            listen_port: 9988,
            wifi_retry_interval_ms: 10_000,
            wifi_max_attempts: None,

            // Probe
            extend_angle_deg: 10,
            neutral_angle_deg: 90,

            // Diagnostics
            latest_radio_firmware,
        }
    }
}

impl DeviceConfig {
    /// Range-check every field.  Returns the first offending field.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.listen_port == 0 {
            return Err("listen_port must be non-zero");
        }
        if self.wifi_retry_interval_ms == 0 {
            return Err("wifi_retry_interval_ms must be non-zero");
        }
        if self.wifi_max_attempts == Some(0) {
            return Err("wifi_max_attempts must allow at least one attempt");
        }
        if self.extend_angle_deg > 180 || self.neutral_angle_deg > 180 {
            return Err("servo angles must be within 0..=180");
        }
        if self.extend_angle_deg == self.neutral_angle_deg {
            return Err("extend and neutral angles must differ");
        }
        Ok(())
    }
}

/// WiFi network credentials.
///
/// Supplied at build time through the `PROBE_WIFI_SSID` and
/// `PROBE_WIFI_PASSWORD` environment variables; never changed at runtime.
#[derive(Clone, PartialEq, Eq)]
pub struct WifiCredentials {
    pub ssid: heapless::String<32>,
    pub password: heapless::String<64>,
}

impl WifiCredentials {
    /// Credentials baked in by the build environment.  Over-long values
    /// are truncated to an empty string so the WiFi adapter rejects them.
    pub fn from_build_env() -> Self {
        Self::new(
            option_env!("PROBE_WIFI_SSID").unwrap_or(""),
            option_env!("PROBE_WIFI_PASSWORD").unwrap_or(""),
        )
    }

    pub fn new(ssid: &str, password: &str) -> Self {
        let mut s = heapless::String::new();
        if s.push_str(ssid).is_err() {
            s.clear();
        }
        let mut p = heapless::String::new();
        if p.push_str(password).is_err() {
            p.clear();
        }
        Self { ssid: s, password: p }
    }
}

// The passphrase must never reach the log.
impl core::fmt::Debug for WifiCredentials {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WifiCredentials")
            .field("ssid", &self.ssid)
            .field("password", &"<redacted>")
            .finish()
    }
}
