//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the business rules for a SmartBin node: command
//! decoding, telemetry construction, and the per-cycle orchestration in
//! [`service`]. All interaction with hardware and the broker happens through
//! **port traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
pub mod telemetry;
