//! Sensor subsystem: the presence detector, the range finder, and the
//! [`SensorHub`] that turns their fallible reads into the infallible values
//! the control loop consumes.
//!
//! Read failures are logged here and mapped to the safe default (no
//! presence, no echo), so a flaky wire degrades one cycle instead of
//! stopping the loop.

pub mod presence;
pub mod ultrasonic;

use embedded_hal::digital::InputPin;
use log::warn;

use crate::control::fill::RangeSample;
use crate::error::Error;
use presence::PirSensor;

/// Anything that can produce one distance measurement on demand.
pub trait RangeFinder {
    /// Timeouts and read failures report [`RangeSample::NoEcho`].
    fn measure(&mut self) -> RangeSample;
}

/// Owns both bin sensors.
pub struct SensorHub<P, R> {
    presence: PirSensor<P>,
    range: R,
}

impl<P: InputPin, R: RangeFinder> SensorHub<P, R> {
    pub fn new(presence: PirSensor<P>, range: R) -> Self {
        Self { presence, range }
    }

    pub fn read_presence(&mut self) -> bool {
        self.presence.read().unwrap_or_else(|e| {
            warn!("PIR: {}, treating as no presence", Error::from(e));
            false
        })
    }

    pub fn read_range(&mut self) -> RangeSample {
        self.range.measure()
    }
}
