//! HC-SR501 passive-infrared presence detector.
//!
//! The module drives its output HIGH while it sees motion (retrigger mode,
//! hold time set by the on-board potentiometer). The firmware samples the
//! level once per cycle; any smoothing is the module's own.

use embedded_hal::digital::InputPin;
use log::debug;

use crate::error::SensorError;

pub struct PirSensor<P> {
    pin: P,
    last: bool,
}

impl<P: InputPin> PirSensor<P> {
    pub fn new(pin: P) -> Self {
        Self { pin, last: false }
    }

    /// Sample the output level. `true` = someone is in front of the bin.
    pub fn read(&mut self) -> Result<bool, SensorError> {
        let present = self.pin.is_high().map_err(|_| SensorError::GpioReadFailed)?;
        if present != self.last {
            debug!("PIR: presence {}", if present { "detected" } else { "cleared" });
        }
        self.last = present;
        Ok(present)
    }

    /// Level seen by the last successful [`read`](Self::read).
    pub fn last(&self) -> bool {
        self.last
    }
}
