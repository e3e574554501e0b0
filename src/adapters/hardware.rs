//! Hardware adapter: bridges the bin's peripherals to the domain port
//! traits.
//!
//! Owns the [`SensorHub`] and the lid [`ServoDriver`], exposing them
//! through [`SensorPort`] and [`LidActuatorPort`]. Generic over the
//! embedded-hal types, so main wires ESP-IDF pins in and the integration
//! tests wire recording mocks in.

use embedded_hal::digital::InputPin;
use embedded_hal::pwm::SetDutyCycle;
use log::warn;

use crate::app::ports::{LidActuatorPort, SensorPort};
use crate::control::fill::RangeSample;
use crate::drivers::servo::ServoDriver;
use crate::error::Error;
use crate::sensors::{RangeFinder, SensorHub};

pub struct HardwareAdapter<P, R, S> {
    sensors: SensorHub<P, R>,
    lid: ServoDriver<S>,
}

impl<P, R, S> HardwareAdapter<P, R, S>
where
    P: InputPin,
    R: RangeFinder,
    S: SetDutyCycle,
{
    pub fn new(sensors: SensorHub<P, R>, lid: ServoDriver<S>) -> Self {
        Self { sensors, lid }
    }

    pub fn lid_angle(&self) -> Option<u8> {
        self.lid.last_angle()
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<P, R, S> SensorPort for HardwareAdapter<P, R, S>
where
    P: InputPin,
    R: RangeFinder,
    S: SetDutyCycle,
{
    fn read_presence(&mut self) -> bool {
        self.sensors.read_presence()
    }

    fn read_range(&mut self) -> RangeSample {
        self.sensors.read_range()
    }
}

// ── LidActuatorPort implementation ────────────────────────────

impl<P, R, S> LidActuatorPort for HardwareAdapter<P, R, S>
where
    P: InputPin,
    R: RangeFinder,
    S: SetDutyCycle,
{
    fn set_lid_angle(&mut self, angle_deg: u8) {
        if let Err(e) = self.lid.set_angle(angle_deg) {
            warn!("Lid servo: {} at {}°", Error::from(e), angle_deg);
        }
    }
}
