//! Outbound message construction.
//!
//! | Topic                     | Payload                          |
//! |---------------------------|----------------------------------|
//! | `smartbin/<id>/telemetry` | `{"fill":<0-100>,"lid":<bool>}`  |
//! | `smartbin/<id>/event`     | `{"event":"emptied"}`            |
//!
//! Payloads are serialized with `serde_json` (field order follows struct
//! declaration order) into a fixed-capacity buffer. A payload that does not
//! fit is an error; nothing is ever truncated.

use core::fmt::Write;

use serde::Serialize;

use crate::config::{validate_topic_segment, ConfigError};
use crate::control::fill::FillLevel;
use crate::error::PayloadError;

/// Outbound buffer size, matching the 128-byte JSON document the node has
/// always used.
pub const PAYLOAD_CAPACITY: usize = 128;

pub type Payload = heapless::Vec<u8, PAYLOAD_CAPACITY>;
pub type Topic = heapless::String<64>;

const TOPIC_ROOT: &str = "smartbin";

// ───────────────────────────────────────────────────────────────
// Topics
// ───────────────────────────────────────────────────────────────

/// The three channels bound to one device identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topics {
    pub control: Topic,
    pub telemetry: Topic,
    pub event: Topic,
}

impl Topics {
    pub fn for_device(device_id: &str) -> Result<Self, ConfigError> {
        validate_topic_segment(device_id)?;
        Ok(Self {
            control: topic(device_id, "control")?,
            telemetry: topic(device_id, "telemetry")?,
            event: topic(device_id, "event")?,
        })
    }
}

fn topic(device_id: &str, leaf: &str) -> Result<Topic, ConfigError> {
    let mut t = Topic::new();
    write!(t, "{TOPIC_ROOT}/{device_id}/{leaf}").map_err(|_| ConfigError::TooLong("device_id"))?;
    Ok(t)
}

// ───────────────────────────────────────────────────────────────
// Wire records
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize)]
struct StatusRecord {
    fill: FillLevel,
    lid: bool,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
enum EventKind {
    Emptied,
}

#[derive(Debug, Clone, Copy, Serialize)]
struct EventRecord {
    event: EventKind,
}

/// Which outbound channel a message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Status,
    Emptied,
}

/// A ready-to-publish message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage<'a> {
    pub kind: MessageKind,
    pub topic: &'a str,
    pub payload: Payload,
}

// ───────────────────────────────────────────────────────────────
// Reporter
// ───────────────────────────────────────────────────────────────

/// Builds outbound messages; knows topics but not transport.
#[derive(Debug, Clone)]
pub struct TelemetryReporter {
    topics: Topics,
}

impl TelemetryReporter {
    pub fn new(topics: Topics) -> Self {
        Self { topics }
    }

    pub fn topics(&self) -> &Topics {
        &self.topics
    }

    pub fn build_status_message(
        &self,
        fill: FillLevel,
        lid_open: bool,
    ) -> Result<OutboundMessage<'_>, PayloadError> {
        Ok(OutboundMessage {
            kind: MessageKind::Status,
            topic: self.topics.telemetry.as_str(),
            payload: encode(&StatusRecord { fill, lid: lid_open })?,
        })
    }

    pub fn build_emptied_message(&self) -> Result<OutboundMessage<'_>, PayloadError> {
        Ok(OutboundMessage {
            kind: MessageKind::Emptied,
            topic: self.topics.event.as_str(),
            payload: encode(&EventRecord {
                event: EventKind::Emptied,
            })?,
        })
    }
}

/// Serialize `msg` into a fixed buffer of `N` bytes.
pub(crate) fn encode<T: Serialize, const N: usize>(
    msg: &T,
) -> Result<heapless::Vec<u8, N>, PayloadError> {
    let bytes = serde_json::to_vec(msg).map_err(|_| PayloadError::Serialize)?;
    heapless::Vec::from_slice(&bytes).map_err(|()| PayloadError::Overflow {
        len: bytes.len(),
        capacity: N,
    })
}
