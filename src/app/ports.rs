//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ BinControlLoop (domain)
//! ```
//!
//! Driven adapters (sensors, lid servo, broker link, event sinks) implement
//! these traits. The [`BinControlLoop`](super::service::BinControlLoop)
//! consumes them via generics, so the domain core never touches hardware
//! or the network directly.

use crate::control::fill::RangeSample;
use crate::error::CommsError;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this once per cycle for each input.
pub trait SensorPort {
    /// Presence detector level. Read failures must report `false`.
    fn read_presence(&mut self) -> bool;

    /// One ranging measurement. Timeouts and read failures must report
    /// [`RangeSample::NoEcho`].
    fn read_range(&mut self) -> RangeSample;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the lid actuator. No position feedback.
pub trait LidActuatorPort {
    fn set_lid_angle(&mut self, angle_deg: u8);
}

// ───────────────────────────────────────────────────────────────
// Link port (driven adapter: domain ↔ broker)
// ───────────────────────────────────────────────────────────────

/// Publish side of the broker session. Inbound commands arrive through the
/// [`CommandInbox`](super::commands::CommandInbox) the adapter was built with.
pub trait LinkPort {
    /// Whether the session is up and subscribed.
    fn is_connected(&self) -> bool;

    /// Re-establish the session. May block up to the adapter's connect
    /// timeout.
    fn reconnect(&mut self) -> Result<(), CommsError>;

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), CommsError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / diagnostics)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Time port
// ───────────────────────────────────────────────────────────────

/// Monotonic microsecond clock, used for echo timing and cycle budgeting.
pub trait TimePort {
    fn uptime_us(&self) -> u64;
}
