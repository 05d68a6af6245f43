//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ProbeService (domain)
//! ```
//!
//! Driven adapters (servo, radio, TCP listener, log sink) implement these
//! traits.  The [`ProbeService`](super::service::ProbeService) and
//! [`bootstrap`](super::bootstrap) consume them via generics, so the domain
//! core never touches hardware directly.

use crate::adapters::tcp_server::ListenerError;
use crate::adapters::wifi::{ConnectivityError, JoinInfo, RetryPolicy};

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the probe servo.
///
/// Methods take `&self` because the same actuator is driven from the main
/// loop and from the touch ISR.
pub trait ActuatorPort: Sync {
    /// Deploy the probe pin.
    fn extend(&self);

    /// Stow the probe pin at neutral.
    fn retract(&self);

    /// Stow the probe pin from interrupt context.  Must not log, block or
    /// allocate.
    fn park_from_isr(&self);

    /// Last commanded angle in degrees.
    fn position(&self) -> u8;
}

// ───────────────────────────────────────────────────────────────
// Connectivity port (driven adapter: domain ↔ WiFi radio)
// ───────────────────────────────────────────────────────────────

pub trait ConnectivityPort {
    /// Whether the radio module answered at all.
    fn module_present(&self) -> bool;

    /// Radio firmware version string as reported by the module.
    fn firmware_version(&self) -> heapless::String<32>;

    /// Store credentials for the next join.  Validates them first.
    fn set_credentials(&mut self, ssid: &str, password: &str) -> Result<(), ConnectivityError>;

    /// Blocking join with fixed-interval retry.  `delay` is called between
    /// failed attempts.
    fn connect(
        &mut self,
        policy: RetryPolicy,
        delay: &mut dyn FnMut(core::time::Duration),
    ) -> Result<JoinInfo, ConnectivityError>;
}

// ───────────────────────────────────────────────────────────────
// Listener / client ports (driven adapter: domain ↔ TCP)
// ───────────────────────────────────────────────────────────────

/// One connected client.  Both operations are non-blocking.
pub trait ClientPort {
    /// At most one byte, or `None` if nothing is waiting.
    fn read_byte(&mut self) -> Option<u8>;

    /// Fire-and-forget single-byte reply.
    fn write_byte(&mut self, value: u8);
}

/// Single-client passive listener.
pub trait ListenerPort {
    type Client: ClientPort;

    /// Non-blocking: accept any pending connection, then return the active
    /// client if it has unread data.
    fn poll_client(&mut self) -> Option<&mut Self::Client>;
}

/// Starts the listener during bootstrap.
pub trait ListenerFactory {
    type Listener: ListenerPort;

    fn start(self, port: u16) -> Result<Self::Listener, ListenerError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → diagnostics)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
