//! Inbound remote commands.
//!
//! The controller publishes raw bytes on `smartbin/<id>/control`. The
//! connectivity adapter posts them into a [`CommandInbox`]; the control loop
//! takes at most one per cycle and decodes it with [`decode`].
//!
//! ```text
//!  MQTT task ──post()──▶ ┌──────────────┐ ──take()──▶ control loop
//!                        │ single slot  │
//!  (newer overwrites)    └──────────────┘  (decode → RemoteCommand)
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use log::debug;

/// Longest payload the inbox stores verbatim. Both valid tokens fit.
pub const MAX_COMMAND_LEN: usize = 16;

/// Commands the controller can send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteCommand {
    Open,
    Close,
    /// Anything that is not exactly `OPEN` or `CLOSE`. Never actuates.
    Unknown,
}

/// Exact, case-sensitive match. No trimming: `b"OPEN\n"` is `Unknown`.
pub fn decode(raw: &[u8]) -> RemoteCommand {
    match raw {
        b"OPEN" => RemoteCommand::Open,
        b"CLOSE" => RemoteCommand::Close,
        _ => RemoteCommand::Unknown,
    }
}

/// A payload as it sat in the inbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawCommand {
    Bytes(heapless::Vec<u8, MAX_COMMAND_LEN>),
    /// Longer than [`MAX_COMMAND_LEN`]; cannot be a valid token.
    Oversized { len: usize },
}

impl RawCommand {
    pub fn from_payload(payload: &[u8]) -> Self {
        match heapless::Vec::from_slice(payload) {
            Ok(bytes) => Self::Bytes(bytes),
            Err(()) => Self::Oversized { len: payload.len() },
        }
    }

    pub fn decode(&self) -> RemoteCommand {
        match self {
            Self::Bytes(bytes) => decode(bytes),
            Self::Oversized { .. } => RemoteCommand::Unknown,
        }
    }
}

/// Single-slot mailbox between the connectivity task and the control loop.
///
/// Posting overwrites any payload not yet taken, so the most recent command
/// wins within a cycle. Safe to post from another task or ISR.
pub struct CommandInbox {
    slot: Signal<CriticalSectionRawMutex, RawCommand>,
}

impl CommandInbox {
    pub const fn new() -> Self {
        Self {
            slot: Signal::new(),
        }
    }

    /// Store `payload`, replacing any undelivered one.
    pub fn post(&self, payload: &[u8]) {
        if self.slot.signaled() {
            debug!("Inbox: overwriting undelivered command");
        }
        self.slot.signal(RawCommand::from_payload(payload));
    }

    /// Remove and return the pending payload, if any.
    pub fn take(&self) -> Option<RawCommand> {
        self.slot.try_take()
    }

    pub fn is_pending(&self) -> bool {
        self.slot.signaled()
    }
}

impl Default for CommandInbox {
    fn default() -> Self {
        Self::new()
    }
}
