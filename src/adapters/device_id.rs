//! Device identity derived from the ESP32 factory MAC address.
//!
//! Used when the build does not pin a `SMARTBIN_DEVICE_ID`. The result,
//! `bin-xxyyzz` (last three MAC bytes, lowercase hex), is stable across
//! reboots and is a valid topic segment.

use core::fmt::Write;

use crate::config::DeviceId;

pub type MacAddress = [u8; 6];

/// Read the factory MAC address from eFuse.
#[cfg(target_os = "espidf")]
pub fn read_mac() -> MacAddress {
    let mut mac: MacAddress = [0u8; 6];
    unsafe {
        esp_idf_svc::sys::esp_efuse_mac_get_default(mac.as_mut_ptr());
    }
    mac
}

/// Simulation: a fixed fake MAC.
#[cfg(not(target_os = "espidf"))]
pub fn read_mac() -> MacAddress {
    [0xDE, 0xAD, 0xBE, 0xEF, 0xCA, 0xFE]
}

pub fn device_id(mac: &MacAddress) -> DeviceId {
    let mut id = DeviceId::new();
    // 10 chars always fit.
    let _ = write!(id, "bin-{:02x}{:02x}{:02x}", mac[3], mac[4], mac[5]);
    id
}
