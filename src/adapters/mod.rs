//! Adapter layer: concrete implementations of the port traits.
//!
//! ```text
//!  ┌──────────────────────┐        ┌──────────────────────┐
//!  │   Port (trait)       │ ◀──────│   Adapter (impl)     │
//!  │   app::ports         │        │   adapters::*        │
//!  └──────────────────────┘        └──────────────────────┘
//! ```
//!
//! Adapters bridge the hexagonal core to the outside world: the WiFi
//! radio, the TCP command socket and the serial log.  The servo adapter
//! lives in [`drivers::probe`](crate::drivers::probe).

pub mod log_sink;
pub mod tcp_server;
pub mod wifi;
