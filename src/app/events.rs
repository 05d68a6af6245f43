//! Outbound application events.
//!
//! The service and bootstrap emit these through the
//! [`EventSink`](super::ports::EventSink) port.  The log adapter renders
//! them on the serial console; nothing here reaches the network client.

use core::net::Ipv4Addr;

use super::commands::ProbeCommand;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Radio firmware is older than the known-latest version.
    FirmwareOutdated {
        current: heapless::String<32>,
        latest: heapless::String<16>,
    },

    /// The radio joined the network.
    Joined {
        ip: Ipv4Addr,
        rssi: Option<i8>,
        attempts: u32,
    },

    /// The TCP listener is accepting connections.
    Listening { port: u16 },

    /// A byte arrived from the client, logged before dispatch.
    CommandReceived(u8),

    /// The byte decoded to a known command and was executed.
    CommandExecuted(ProbeCommand),

    /// A touch query was answered.
    TouchReported(bool),
}
