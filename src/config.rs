//! Node configuration parameters
//!
//! All tunable parameters for a SmartBin node. Defaults mirror the
//! reference hardware (HC-SR04 mounted in a 40 cm deep bin, SG90 lid servo).
//! Identity, Wi-Fi credentials and broker address are overlaid at build time
//! from `SMARTBIN_*` environment variables; see [`Overrides::from_build_env`].

use core::fmt;

use serde::{Deserialize, Serialize};

pub const DEFAULT_DEVICE_ID: &str = "bin-001";
pub const DEFAULT_BROKER_HOST: &str = "test.mosquitto.org";

/// Errors from configuration validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// A string value does not fit its fixed-capacity field.
    TooLong(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::TooLong(field) => write!(f, "{} too long", field),
        }
    }
}

impl core::error::Error for ConfigError {}

/// Topic-safe device identifier.
pub type DeviceId = heapless::String<32>;

/// Core node configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinConfig {
    // --- Identity ---
    /// Device id, used as the `<id>` segment of every topic.
    pub device_id: DeviceId,

    // --- Network ---
    pub wifi_ssid: heapless::String<32>,
    pub wifi_password: heapless::String<64>,
    pub broker_host: heapless::String<64>,
    pub broker_port: u16,
    /// How long a reconnect may block waiting for the broker (milliseconds)
    pub broker_connect_timeout_ms: u32,

    // --- Fill calibration ---
    /// Distance from sensor to surface when the bin is full (mm)
    pub full_distance_mm: u16,
    /// Distance from sensor to the bottom of an empty bin (mm)
    pub empty_distance_mm: u16,
    /// Single-cycle fill drop (percentage points) that counts as emptied
    pub drop_threshold_pct: u8,
    /// Echo wait bound for the ultrasonic ranger (microseconds)
    pub echo_timeout_us: u32,

    // --- Lid ---
    pub open_angle_deg: u8,
    pub close_angle_deg: u8,

    // --- Timing ---
    /// Control loop period (milliseconds)
    pub cycle_period_ms: u32,
}

impl Default for BinConfig {
    fn default() -> Self {
        Self {
            device_id: try_fixed(DEFAULT_DEVICE_ID, "device_id")
                .expect("default device_id fits"),

            wifi_ssid: heapless::String::new(),
            wifi_password: heapless::String::new(),
            broker_host: try_fixed(DEFAULT_BROKER_HOST, "broker_host")
                .expect("default broker_host fits"),
            broker_port: 1883,
            broker_connect_timeout_ms: 5_000,

            full_distance_mm: 50,   // 5 cm
            empty_distance_mm: 400, // 40 cm
            drop_threshold_pct: 30,
            echo_timeout_us: 30_000,

            open_angle_deg: 90,
            close_angle_deg: 0,

            cycle_period_ms: 300,
        }
    }
}

impl BinConfig {
    /// Range-check every field. Called once at startup; the firmware refuses
    /// to run with a configuration that fails here.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_topic_segment(self.device_id.as_str())?;
        if self.broker_host.is_empty() {
            return Err(ConfigError::ValidationFailed("broker_host is empty"));
        }
        if self.broker_port == 0 {
            return Err(ConfigError::ValidationFailed("broker_port must be non-zero"));
        }
        if self.empty_distance_mm <= self.full_distance_mm {
            return Err(ConfigError::ValidationFailed(
                "empty_distance_mm must exceed full_distance_mm",
            ));
        }
        if self.drop_threshold_pct > 100 {
            return Err(ConfigError::ValidationFailed("drop_threshold_pct must be <= 100"));
        }
        if self.echo_timeout_us == 0 {
            return Err(ConfigError::ValidationFailed("echo_timeout_us must be non-zero"));
        }
        if self.open_angle_deg > 180 || self.close_angle_deg > 180 {
            return Err(ConfigError::ValidationFailed("servo angles must be <= 180"));
        }
        if self.open_angle_deg == self.close_angle_deg {
            return Err(ConfigError::ValidationFailed("open and close angles are equal"));
        }
        if self.cycle_period_ms == 0 {
            return Err(ConfigError::ValidationFailed("cycle_period_ms must be non-zero"));
        }
        Ok(())
    }

    /// Apply build-time or test-supplied overrides on top of `self`.
    pub fn with_overrides(mut self, o: &Overrides<'_>) -> Result<Self, ConfigError> {
        if let Some(id) = o.device_id {
            self.device_id = try_fixed(id, "device_id")?;
        }
        if let Some(ssid) = o.wifi_ssid {
            self.wifi_ssid = try_fixed(ssid, "wifi_ssid")?;
        }
        if let Some(pass) = o.wifi_password {
            self.wifi_password = try_fixed(pass, "wifi_password")?;
        }
        if let Some(host) = o.broker_host {
            self.broker_host = try_fixed(host, "broker_host")?;
        }
        if let Some(port) = o.broker_port {
            self.broker_port = port
                .parse()
                .map_err(|_| ConfigError::ValidationFailed("broker_port is not a port number"))?;
        }
        Ok(self)
    }
}

/// Optional string overrides for [`BinConfig`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Overrides<'a> {
    pub device_id: Option<&'a str>,
    pub wifi_ssid: Option<&'a str>,
    pub wifi_password: Option<&'a str>,
    pub broker_host: Option<&'a str>,
    pub broker_port: Option<&'a str>,
}

impl Overrides<'static> {
    /// Values baked in at compile time through `SMARTBIN_*` variables.
    pub const fn from_build_env() -> Self {
        Self {
            device_id: option_env!("SMARTBIN_DEVICE_ID"),
            wifi_ssid: option_env!("SMARTBIN_WIFI_SSID"),
            wifi_password: option_env!("SMARTBIN_WIFI_PASS"),
            broker_host: option_env!("SMARTBIN_MQTT_HOST"),
            broker_port: option_env!("SMARTBIN_MQTT_PORT"),
        }
    }
}

/// A device id must be usable as a single MQTT topic level.
pub fn validate_topic_segment(id: &str) -> Result<(), ConfigError> {
    if id.is_empty() {
        return Err(ConfigError::ValidationFailed("device_id is empty"));
    }
    if id.bytes().any(|b| matches!(b, b'/' | b'+' | b'#') || !(0x21..=0x7E).contains(&b)) {
        return Err(ConfigError::ValidationFailed(
            "device_id must be printable ASCII without '/', '+' or '#'",
        ));
    }
    Ok(())
}

fn try_fixed<const N: usize>(s: &str, field: &'static str) -> Result<heapless::String<N>, ConfigError> {
    heapless::String::try_from(s).map_err(|_| ConfigError::TooLong(field))
}
