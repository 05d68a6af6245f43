//! Touch-probe actuator.
//!
//! Two positions matter: *extended* (pin deployed, ready to touch) and
//! *neutral* (pin stowed).  Both are absolute servo angles, so every call
//! is idempotent and unconditional; there is no state machine guarding
//! re-entry.
//!
//! ## Safety contract
//!
//! The touch ISR parks the probe at neutral through
//! [`ActuatorPort::park_from_isr`], which must not log or allocate.

use embedded_hal::pwm::SetDutyCycle;
use log::{info, warn};

use crate::app::ports::ActuatorPort;
use crate::drivers::servo::ServoDriver;

pub struct ProbeActuator<P> {
    servo: ServoDriver<P>,
    extend_deg: u8,
    neutral_deg: u8,
}

impl<P> ProbeActuator<P>
where
    P: SetDutyCycle + Copy,
{
    pub fn new(pwm: P, extend_deg: u8, neutral_deg: u8) -> Self {
        Self {
            servo: ServoDriver::new(pwm, neutral_deg),
            extend_deg,
            neutral_deg,
        }
    }

    /// Drive to neutral for the first time.  A failed write is reported
    /// but leaves the actuator usable; later commands retry the output.
    pub fn initialize(&self) -> Result<(), P::Error> {
        self.servo.write_angle(self.neutral_deg)?;
        info!("Probe: initialised at neutral ({}°)", self.neutral_deg);
        Ok(())
    }

    fn move_to(&self, angle: u8) {
        if let Err(e) = self.servo.write_angle(angle) {
            warn!("Probe: servo write {}° failed: {:?}", angle, e);
        }
    }
}

impl<P> ActuatorPort for ProbeActuator<P>
where
    P: SetDutyCycle + Copy + Sync,
{
    fn extend(&self) {
        self.move_to(self.extend_deg);
    }

    fn retract(&self) {
        self.move_to(self.neutral_deg);
    }

    fn park_from_isr(&self) {
        let _ = self.servo.write_angle(self.neutral_deg);
    }

    fn position(&self) -> u8 {
        self.servo.angle()
    }
}
