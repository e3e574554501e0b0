//! Actuator and supervision drivers.

pub mod servo;
pub mod watchdog;
