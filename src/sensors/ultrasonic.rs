//! HC-SR04 ultrasonic range finder.
//!
//! ```text
//!  TRIG  ──┐  ┌──────────┐
//!          └──┘  10 µs   └─────────────────────────────
//!  ECHO  ──────────────────┐        width        ┌─────
//!                          └─────────────────────┘
//!                          |◀── round trip µs ──▶|
//! ```
//!
//! The echo width is timed by polling against a monotonic clock. Each phase
//! (waiting for the rising edge, then for the falling edge) is bounded by
//! the echo timeout, so a missing target or a stuck pin can never stall the
//! control loop for longer than two timeouts.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use log::warn;

use crate::app::ports::TimePort;
use crate::control::fill::RangeSample;
use crate::error::{Error, SensorError};

use super::RangeFinder;

const SETTLE_US: u32 = 2;
const TRIGGER_PULSE_US: u32 = 10;

pub struct Hcsr04<T, E, D, C> {
    trigger: T,
    echo: E,
    delay: D,
    clock: C,
    timeout_us: u32,
}

impl<T, E, D, C> Hcsr04<T, E, D, C>
where
    T: OutputPin,
    E: InputPin,
    D: DelayNs,
    C: TimePort,
{
    pub fn new(trigger: T, echo: E, delay: D, clock: C, timeout_us: u32) -> Self {
        Self {
            trigger,
            echo,
            delay,
            clock,
            timeout_us,
        }
    }

    pub fn timeout_us(&self) -> u32 {
        self.timeout_us
    }

    /// Fire one ping and time the echo.
    pub fn ping(&mut self) -> Result<RangeSample, SensorError> {
        self.trigger.set_low().map_err(|_| SensorError::GpioWriteFailed)?;
        self.delay.delay_us(SETTLE_US);
        self.trigger.set_high().map_err(|_| SensorError::GpioWriteFailed)?;
        self.delay.delay_us(TRIGGER_PULSE_US);
        self.trigger.set_low().map_err(|_| SensorError::GpioWriteFailed)?;

        let armed = self.clock.uptime_us();
        if !self.wait_for(true, armed)? {
            return Ok(RangeSample::NoEcho);
        }

        let rise = self.clock.uptime_us();
        if !self.wait_for(false, rise)? {
            return Ok(RangeSample::NoEcho);
        }
        let width = self.clock.uptime_us().saturating_sub(rise);

        Ok(RangeSample::from_echo_us(u32::try_from(width).unwrap_or(u32::MAX)))
    }

    /// Poll until the echo pin reads `level`. `false` on timeout.
    fn wait_for(&mut self, level: bool, since: u64) -> Result<bool, SensorError> {
        loop {
            if self.echo.is_high().map_err(|_| SensorError::GpioReadFailed)? == level {
                return Ok(true);
            }
            if self.clock.uptime_us().saturating_sub(since) > u64::from(self.timeout_us) {
                return Ok(false);
            }
        }
    }
}

impl<T, E, D, C> RangeFinder for Hcsr04<T, E, D, C>
where
    T: OutputPin,
    E: InputPin,
    D: DelayNs,
    C: TimePort,
{
    fn measure(&mut self) -> RangeSample {
        match self.ping() {
            Ok(sample) => sample,
            Err(e) => {
                warn!("HC-SR04: {}", Error::from(e));
                RangeSample::NoEcho
            }
        }
    }
}
