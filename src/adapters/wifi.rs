//! WiFi station-mode adapter.
//!
//! Implements [`ConnectivityPort`], the hexagonal boundary for network
//! connectivity.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF WiFi driver via
//!   `esp_idf_svc::wifi::BlockingWifi`.
//! - **all other targets**: a simulated radio for host-side tests.
//!
//! ## Join policy
//!
//! [`connect`](ConnectivityPort::connect) blocks until the join succeeds,
//! retrying at a fixed interval with no backoff.  An unattended probe is
//! useless without the network, so the production policy never gives up.
//! There is no reconnection once joined.

use core::fmt;
use core::net::Ipv4Addr;
use core::time::Duration;

use log::{info, warn};

use crate::app::ports::ConnectivityPort;
use crate::config::DeviceConfig;

#[cfg(target_os = "espidf")]
use esp_idf_svc::{
    eventloop::EspSystemEventLoop,
    hal::modem::Modem,
    nvs::EspDefaultNvsPartition,
    wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi},
};

// ───────────────────────────────────────────────────────────────
// Errors
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityError {
    ModuleNotFound,
    NoCredentials,
    InvalidSsid,
    InvalidPassword,
    ConnectionFailed,
    AlreadyConnected,
    RetriesExhausted,
}

impl fmt::Display for ConnectivityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ModuleNotFound => write!(f, "WiFi module not found"),
            Self::NoCredentials => write!(f, "no WiFi credentials configured"),
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)"),
            Self::ConnectionFailed => write!(f, "WiFi connection failed"),
            Self::AlreadyConnected => write!(f, "already connected to AP"),
            Self::RetriesExhausted => write!(f, "gave up after the configured number of join attempts"),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Retry policy / join report
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub interval: Duration,
    /// `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl RetryPolicy {
    pub const fn forever(interval: Duration) -> Self {
        Self {
            interval,
            max_attempts: None,
        }
    }

    pub fn from_config(config: &DeviceConfig) -> Self {
        Self {
            interval: Duration::from_millis(config.wifi_retry_interval_ms as u64),
            max_attempts: config.wifi_max_attempts,
        }
    }

    fn exhausted(&self, attempts: u32) -> bool {
        self.max_attempts.is_some_and(|max| attempts >= max)
    }
}

/// Result of a successful join.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinInfo {
    pub ip: Ipv4Addr,
    pub rssi: Option<i8>,
    pub attempts: u32,
}

// ───────────────────────────────────────────────────────────────
// Connection state
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiState {
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn validate_ssid(ssid: &str) -> Result<(), ConnectivityError> {
    if ssid.is_empty() || ssid.len() > 32 {
        return Err(ConnectivityError::InvalidSsid);
    }
    if !ssid.bytes().all(|b| (0x20..=0x7E).contains(&b)) {
        return Err(ConnectivityError::InvalidSsid);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ConnectivityError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(ConnectivityError::InvalidPassword);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// Firmware version check
// ───────────────────────────────────────────────────────────────

/// Parse `"v5.2.1"`, `"5.1"` or `"5.2.1-dirty"` into `[major, minor, patch]`.
fn parse_version(s: &str) -> Option<[u32; 3]> {
    let s = s.trim().trim_start_matches(['v', 'V']);
    let mut out = [0u32; 3];
    let mut parts = s.split('.');
    for (i, slot) in out.iter_mut().enumerate() {
        let Some(part) = parts.next() else {
            if i == 0 {
                return None;
            }
            break;
        };
        let digits = part
            .find(|c: char| !c.is_ascii_digit())
            .map_or(part, |end| &part[..end]);
        *slot = digits.parse().ok()?;
    }
    Some(out)
}

/// Whether `current` is older than `latest`.  An unreadable `current`
/// counts as outdated; an unreadable `latest` never warns.
pub fn firmware_outdated(current: &str, latest: &str) -> bool {
    match (parse_version(current), parse_version(latest)) {
        (_, None) => false,
        (None, Some(_)) => true,
        (Some(c), Some(l)) => c < l,
    }
}

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiAdapter {
    state: WifiState,
    ssid: heapless::String<32>,
    password: heapless::String<64>,

    #[cfg(target_os = "espidf")]
    wifi: Option<BlockingWifi<EspWifi<'static>>>,
    #[cfg(target_os = "espidf")]
    configured: bool,

    #[cfg(not(target_os = "espidf"))]
    sim: SimRadio,
}

/// Host-side stand-in for the radio.
#[cfg(not(target_os = "espidf"))]
#[derive(Debug, Clone)]
struct SimRadio {
    present: bool,
    failures_remaining: u32,
    firmware: heapless::String<32>,
}

impl WifiAdapter {
    fn with_platform(
        #[cfg(target_os = "espidf")] wifi: Option<BlockingWifi<EspWifi<'static>>>,
        #[cfg(not(target_os = "espidf"))] sim: SimRadio,
    ) -> Self {
        Self {
            state: WifiState::Disconnected,
            ssid: heapless::String::new(),
            password: heapless::String::new(),
            #[cfg(target_os = "espidf")]
            wifi,
            #[cfg(target_os = "espidf")]
            configured: false,
            #[cfg(not(target_os = "espidf"))]
            sim,
        }
    }

    /// Bring up the station driver.  A driver that cannot be created means
    /// the radio is unusable; the adapter is still returned and reports
    /// itself absent through [`ConnectivityPort::module_present`].
    #[cfg(target_os = "espidf")]
    pub fn new(
        modem: Modem,
        sysloop: EspSystemEventLoop,
        nvs: Option<EspDefaultNvsPartition>,
    ) -> Self {
        let wifi = EspWifi::new(modem, sysloop.clone(), nvs)
            .and_then(|driver| BlockingWifi::wrap(driver, sysloop));
        let wifi = match wifi {
            Ok(w) => Some(w),
            Err(e) => {
                warn!("WiFi: driver init failed: {}", e);
                None
            }
        };
        Self::with_platform(wifi)
    }

    /// Simulated radio that is present and joins on the first attempt.
    #[cfg(not(target_os = "espidf"))]
    pub fn new() -> Self {
        Self::simulated(true, 0, "5.2.1")
    }

    /// Simulated radio with explicit presence, number of failed join
    /// attempts before success, and reported firmware version.
    #[cfg(not(target_os = "espidf"))]
    pub fn simulated(present: bool, failures_before_join: u32, firmware: &str) -> Self {
        let mut fw = heapless::String::new();
        let _ = fw.push_str(firmware);
        Self::with_platform(SimRadio {
            present,
            failures_remaining: failures_before_join,
            firmware: fw,
        })
    }

    pub fn state(&self) -> WifiState {
        self.state
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_present(&self) -> bool {
        self.wifi.is_some()
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_present(&self) -> bool {
        self.sim.present
    }

    #[cfg(target_os = "espidf")]
    fn platform_firmware(&self) -> heapless::String<32> {
        // The radio firmware ships inside ESP-IDF, so its version is the
        // IDF version string.
        // SAFETY: esp_get_idf_version returns a pointer to a static
        // NUL-terminated string.
        let raw = unsafe { core::ffi::CStr::from_ptr(esp_idf_svc::sys::esp_get_idf_version()) };
        let mut out = heapless::String::new();
        let _ = out.push_str(raw.to_str().unwrap_or(""));
        out
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_firmware(&self) -> heapless::String<32> {
        self.sim.firmware.clone()
    }

    #[cfg(target_os = "espidf")]
    fn platform_connect(&mut self) -> Result<Ipv4Addr, ConnectivityError> {
        let wifi = self.wifi.as_mut().ok_or(ConnectivityError::ModuleNotFound)?;

        if !self.configured {
            let auth_method = if self.password.is_empty() {
                AuthMethod::None
            } else {
                AuthMethod::WPA2Personal
            };
            let client = ClientConfiguration {
                ssid: self
                    .ssid
                    .as_str()
                    .try_into()
                    .map_err(|_| ConnectivityError::InvalidSsid)?,
                password: self
                    .password
                    .as_str()
                    .try_into()
                    .map_err(|_| ConnectivityError::InvalidPassword)?,
                auth_method,
                ..Default::default()
            };
            wifi.set_configuration(&Configuration::Client(client))
                .map_err(|e| {
                    warn!("WiFi: set_configuration failed: {}", e);
                    ConnectivityError::ConnectionFailed
                })?;
            wifi.start().map_err(|e| {
                warn!("WiFi: start failed: {}", e);
                ConnectivityError::ConnectionFailed
            })?;
            self.configured = true;
        }

        wifi.connect().map_err(|e| {
            warn!("WiFi: connect failed: {}", e);
            ConnectivityError::ConnectionFailed
        })?;
        wifi.wait_netif_up().map_err(|e| {
            warn!("WiFi: no DHCP lease: {}", e);
            ConnectivityError::ConnectionFailed
        })?;

        let ip_info = wifi.wifi().sta_netif().get_ip_info().map_err(|e| {
            warn!("WiFi: get_ip_info failed: {}", e);
            ConnectivityError::ConnectionFailed
        })?;
        Ok(Ipv4Addr::from(ip_info.ip.octets()))
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_connect(&mut self) -> Result<Ipv4Addr, ConnectivityError> {
        if self.sim.failures_remaining > 0 {
            self.sim.failures_remaining -= 1;
            return Err(ConnectivityError::ConnectionFailed);
        }
        Ok(Ipv4Addr::new(192, 168, 4, 2))
    }

    #[cfg(target_os = "espidf")]
    fn platform_rssi(&self) -> Option<i8> {
        let mut ap_info = esp_idf_svc::sys::wifi_ap_record_t::default();
        // SAFETY: Writes into a caller-owned record; STA is connected.
        let ret = unsafe { esp_idf_svc::sys::esp_wifi_sta_get_ap_info(&mut ap_info) };
        (ret == esp_idf_svc::sys::ESP_OK as i32).then_some(ap_info.rssi)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_rssi(&self) -> Option<i8> {
        (self.state == WifiState::Connected).then_some(-60)
    }
}

#[cfg(not(target_os = "espidf"))]
impl Default for WifiAdapter {
    fn default() -> Self {
        Self::new()
    }
}

// ───────────────────────────────────────────────────────────────
// ConnectivityPort
// ───────────────────────────────────────────────────────────────

impl ConnectivityPort for WifiAdapter {
    fn module_present(&self) -> bool {
        self.platform_present()
    }

    fn firmware_version(&self) -> heapless::String<32> {
        self.platform_firmware()
    }

    fn set_credentials(&mut self, ssid: &str, password: &str) -> Result<(), ConnectivityError> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        self.ssid.clear();
        self.ssid.push_str(ssid).map_err(|_| ConnectivityError::InvalidSsid)?;
        self.password.clear();
        self.password.push_str(password).map_err(|_| ConnectivityError::InvalidPassword)?;
        info!("WiFi: credentials set (SSID='{}')", self.ssid);
        Ok(())
    }

    fn connect(
        &mut self,
        policy: RetryPolicy,
        delay: &mut dyn FnMut(Duration),
    ) -> Result<JoinInfo, ConnectivityError> {
        if !self.platform_present() {
            return Err(ConnectivityError::ModuleNotFound);
        }
        if self.ssid.is_empty() {
            return Err(ConnectivityError::NoCredentials);
        }
        if self.state == WifiState::Connected {
            return Err(ConnectivityError::AlreadyConnected);
        }

        let mut attempt: u32 = 0;
        loop {
            attempt = attempt.saturating_add(1);
            self.state = WifiState::Connecting;
            info!("WiFi: attempting to connect to WPA SSID '{}' (attempt {})", self.ssid, attempt);

            match self.platform_connect() {
                Ok(ip) => {
                    self.state = WifiState::Connected;
                    let rssi = self.platform_rssi();
                    info!("WiFi: connected, IP={} RSSI={:?}", ip, rssi);
                    return Ok(JoinInfo {
                        ip,
                        rssi,
                        attempts: attempt,
                    });
                }
                Err(ConnectivityError::ModuleNotFound) => {
                    self.state = WifiState::Failed;
                    return Err(ConnectivityError::ModuleNotFound);
                }
                Err(e) => {
                    warn!("WiFi: attempt {} failed: {}", attempt, e);
                    if policy.exhausted(attempt) {
                        self.state = WifiState::Failed;
                        return Err(ConnectivityError::RetriesExhausted);
                    }
                    delay(policy.interval);
                }
            }
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
