//! Application core: pure domain logic, zero direct I/O.
//!
//! Command dispatch, the touch latch context and the boot sequence.  All
//! interaction with hardware and sockets happens through **port traits**
//! defined in [`ports`], keeping this layer testable without a device.

pub mod bootstrap;
pub mod commands;
pub mod context;
pub mod events;
pub mod ports;
pub mod service;
