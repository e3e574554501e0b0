//! SmartBin node firmware library.
//!
//! Exposes the control core and its adapters for the binary, the
//! integration tests and the fuzz targets. All ESP-IDF-specific code is
//! guarded by `#[cfg(target_os = "espidf")]` within each module; every
//! other target gets simulation stand-ins.

#![deny(unused_must_use)]

// Host critical-section implementation for the command inbox.
#[cfg(test)]
use critical_section as _;

pub mod app;
pub mod config;
pub mod control;
pub mod fsm;

pub mod adapters;
pub mod drivers;
pub mod error;
pub mod pins;
pub mod sensors;
