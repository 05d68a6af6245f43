//! Unified error types for the probe bridge firmware.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! bootstrap path's error handling uniform.  All variants are `Copy`.

use core::fmt;

use crate::adapters::tcp_server::ListenerError;
use crate::adapters::wifi::ConnectivityError;
use crate::drivers::hw_init::HwInitError;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The WiFi radio did not respond.  The only fatal condition.
    ModuleNotFound,
    /// WiFi join failed (only reachable with a bounded retry policy).
    Comms(ConnectivityError),
    /// The TCP listener could not be started.
    Listener(ListenerError),
    /// Peripheral initialisation failed.
    Init(HwInitError),
    /// Configuration is invalid.
    Config(&'static str),
}

impl Error {
    /// Whether the device must halt instead of continuing degraded.
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::ModuleNotFound)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ModuleNotFound => write!(f, "communication with WiFi module failed"),
            Self::Comms(e) => write!(f, "comms: {e}"),
            Self::Listener(e) => write!(f, "listener: {e}"),
            Self::Init(e) => write!(f, "init: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<ConnectivityError> for Error {
    fn from(e: ConnectivityError) -> Self {
        match e {
            ConnectivityError::ModuleNotFound => Self::ModuleNotFound,
            other => Self::Comms(other),
        }
    }
}

impl From<ListenerError> for Error {
    fn from(e: ListenerError) -> Self {
        Self::Listener(e)
    }
}

impl From<HwInitError> for Error {
    fn from(e: HwInitError) -> Self {
        Self::Init(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
