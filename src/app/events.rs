//! Outbound diagnostic events.
//!
//! The [`BinControlLoop`](super::service::BinControlLoop) emits these through
//! the [`EventSink`](super::ports::EventSink) port. They are local
//! diagnostics (serial log); the wire messages for the controller are built
//! by [`TelemetryReporter`](super::telemetry::TelemetryReporter).

use crate::app::commands::RemoteCommand;
use crate::app::telemetry::MessageKind;
use crate::control::fill::FillLevel;
use crate::error::Error;
use crate::fsm::{LidState, LidTransition};

/// Structured events emitted by the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// The loop has parked the lid and is about to run its first cycle.
    Started { period_ms: u32 },

    /// A remote command was taken from the inbox this cycle.
    CommandReceived(RemoteCommand),

    /// The lid actuator was written.
    LidMoved(LidTransition),

    /// Fill dropped by more than the threshold.
    Emptied { previous: FillLevel, current: FillLevel },

    /// End-of-cycle summary.
    Status { fill: FillLevel, lid: LidState },

    /// The link was down and could not be restored; the cycle did nothing.
    CycleSkipped(Error),

    /// A message was built but the link rejected it.
    PublishFailed { kind: MessageKind, error: Error },

    /// A message could not be built and was dropped.
    PayloadDropped { kind: MessageKind, error: Error },
}
