//! Device context shared by the touch ISR and the poll loop.
//!
//! Owns the touch latch and the probe actuator.  Constructed once during
//! bootstrap, leaked to `'static`, and handed to both the ISR registration
//! (as the handler argument) and the main loop.  There is no teardown.

use crate::sensors::TouchLatch;

use super::ports::ActuatorPort;

pub struct DeviceContext<A> {
    latch: TouchLatch,
    actuator: A,
}

impl<A: ActuatorPort> DeviceContext<A> {
    pub const fn new(actuator: A) -> Self {
        Self {
            latch: TouchLatch::new(),
            actuator,
        }
    }

    /// Promote to `'static` for ISR registration.
    pub fn leak(self) -> &'static Self
    where
        A: 'static,
    {
        Box::leak(Box::new(self))
    }

    /// Touch ISR body: latch the event, then park the probe at neutral.
    ///
    /// The park duplicates what a client's retract command does.  It keeps
    /// the pin from being driven into the surface after contact.
    pub fn on_touch(&self) {
        self.latch.signal();
        self.actuator.park_from_isr();
    }

    pub fn latch(&self) -> &TouchLatch {
        &self.latch
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }
}
