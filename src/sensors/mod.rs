//! Sensor inputs.
//!
//! The bridge has one: the probe's touch line, latched from its ISR.

pub mod touch;

pub use touch::TouchLatch;
