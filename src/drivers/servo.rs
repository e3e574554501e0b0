//! Hobby servo (SG90 class) on a 50 Hz PWM channel.
//!
//! Position is set by pulse width within the 20 ms frame: 544 µs at 0°,
//! 2400 µs at 180°, linear in between. The driver has no position
//! feedback; it only remembers the last angle it commanded.
//!
//! On ESP-IDF the channel is an `LedcDriver`; on host/test any
//! [`SetDutyCycle`] implementation will do.

use embedded_hal::pwm::SetDutyCycle;

use crate::error::ActuatorError;

pub const FRAME_US: u16 = 20_000;
pub const MIN_PULSE_US: u16 = 544;
pub const MAX_PULSE_US: u16 = 2_400;
pub const MAX_ANGLE_DEG: u8 = 180;

pub struct ServoDriver<P> {
    pwm: P,
    last_angle: Option<u8>,
}

impl<P: SetDutyCycle> ServoDriver<P> {
    pub fn new(pwm: P) -> Self {
        Self {
            pwm,
            last_angle: None,
        }
    }

    /// Command `angle_deg` (clamped to 180°).
    pub fn set_angle(&mut self, angle_deg: u8) -> Result<(), ActuatorError> {
        let angle = angle_deg.min(MAX_ANGLE_DEG);
        self.pwm
            .set_duty_cycle_fraction(pulse_us(angle), FRAME_US)
            .map_err(|_| ActuatorError::PwmWriteFailed)?;
        self.last_angle = Some(angle);
        Ok(())
    }

    /// Last successfully commanded angle; `None` before the first write.
    pub fn last_angle(&self) -> Option<u8> {
        self.last_angle
    }
}

/// Pulse width for an angle already clamped to [0, 180].
pub fn pulse_us(angle_deg: u8) -> u16 {
    let span = u32::from(MAX_PULSE_US - MIN_PULSE_US);
    let offset = span * u32::from(angle_deg.min(MAX_ANGLE_DEG)) / u32::from(MAX_ANGLE_DEG);
    MIN_PULSE_US + offset as u16
}
