//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing each [`AppEvent`] as one tagged line
//! to the logger (UART / USB-CDC in production). The tag in front of the
//! `|` makes the serial stream easy to grep.

use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { period_ms } => {
                info!("START | period={}ms", period_ms);
            }
            AppEvent::CommandReceived(cmd) => {
                info!("CMD   | {:?}", cmd);
            }
            AppEvent::LidMoved(t) => {
                info!("LID   | {} -> {} ({:?})", t.from.name(), t.to.name(), t.cause);
            }
            AppEvent::Emptied { previous, current } => {
                info!("EMPTY | {} -> {}", previous, current);
            }
            AppEvent::Status { fill, lid } => {
                debug!("TELEM | fill={} lid={}", fill, lid.name());
            }
            AppEvent::CycleSkipped(e) => {
                warn!("SKIP  | {}", e);
            }
            AppEvent::PublishFailed { kind, error } => {
                warn!("PUB   | {:?} failed: {}", kind, error);
            }
            AppEvent::PayloadDropped { kind, error } => {
                warn!("DROP  | {:?}: {}", kind, error);
            }
        }
    }
}
