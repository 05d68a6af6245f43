//! Hobby-servo PWM driver.
//!
//! Maps an absolute angle (0–180°) onto a pulse width between
//! [`SERVO_MIN_PULSE_US`] and [`SERVO_MAX_PULSE_US`], then onto a duty
//! value for any [`SetDutyCycle`] output running at [`SERVO_PWM_FREQ_HZ`].
//!
//! ## Sharing with ISR context
//!
//! The touch ISR must be able to park the servo, so every method takes
//! `&self`.  The PWM handle is `Copy` and stateless (a channel number on
//! the device), and the last commanded angle lives in an atomic.
//!
//! [`SERVO_PWM_FREQ_HZ`]: crate::pins::SERVO_PWM_FREQ_HZ

use core::sync::atomic::{AtomicU8, Ordering};

use embedded_hal::pwm::SetDutyCycle;

use crate::pins::{SERVO_MAX_PULSE_US, SERVO_MIN_PULSE_US, SERVO_PERIOD_US};

/// Highest commandable angle.
pub const MAX_ANGLE_DEG: u8 = 180;

/// Pulse width for `angle`, clamped to [`MAX_ANGLE_DEG`].
pub const fn pulse_width_us(angle: u8) -> u32 {
    let angle = if angle > MAX_ANGLE_DEG {
        MAX_ANGLE_DEG
    } else {
        angle
    };
    SERVO_MIN_PULSE_US
        + (angle as u32) * (SERVO_MAX_PULSE_US - SERVO_MIN_PULSE_US) / MAX_ANGLE_DEG as u32
}

/// Duty value that produces `angle` on an output whose full scale is
/// `max_duty`.
pub const fn duty_for_angle(angle: u8, max_duty: u16) -> u16 {
    ((pulse_width_us(angle) as u64 * max_duty as u64) / SERVO_PERIOD_US as u64) as u16
}

pub struct ServoDriver<P> {
    pwm: P,
    angle: AtomicU8,
}

impl<P> ServoDriver<P>
where
    P: SetDutyCycle + Copy,
{
    /// Wrap a PWM output.  `rest_angle` is where the horn is assumed to sit
    /// until the first [`write_angle`](Self::write_angle); nothing is
    /// written here.
    pub fn new(pwm: P, rest_angle: u8) -> Self {
        Self {
            pwm,
            angle: AtomicU8::new(rest_angle.min(MAX_ANGLE_DEG)),
        }
    }

    /// Command an absolute angle.  Values above 180 are clamped.
    ///
    /// The angle is claimed before the duty write.  If the touch ISR parks
    /// the servo in between, the parked angle wins and is written again, so
    /// [`angle`](Self::angle) always matches the last duty on the pin.  A
    /// failed write hands the previous angle back.
    pub fn write_angle(&self, angle: u8) -> Result<(), P::Error> {
        let angle = angle.min(MAX_ANGLE_DEG);
        let previous = self.angle.swap(angle, Ordering::AcqRel);

        if let Err(e) = self.output(angle) {
            let _ = self
                .angle
                .compare_exchange(angle, previous, Ordering::AcqRel, Ordering::Acquire);
            return Err(e);
        }

        let current = self.angle.load(Ordering::Acquire);
        if current != angle {
            self.output(current)?;
        }
        Ok(())
    }

    /// Last angle driven onto the pin (or the rest angle before any write).
    pub fn angle(&self) -> u8 {
        self.angle.load(Ordering::Acquire)
    }

    fn output(&self, angle: u8) -> Result<(), P::Error> {
        let mut pwm = self.pwm;
        let duty = duty_for_angle(angle, pwm.max_duty_cycle());
        pwm.set_duty_cycle(duty)
    }
}
