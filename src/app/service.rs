//! Control loop, the hexagonal core.
//!
//! [`BinControlLoop`] owns the fill pipeline, the lid rule engine, the
//! telemetry reporter and the node's only retained memory ([`BinState`]).
//! All I/O flows through port traits injected at call sites, making the
//! entire loop testable with mock adapters.
//!
//! ```text
//!  SensorPort ──▶ ┌──────────────────────────────┐ ──▶ LinkPort
//!                 │        BinControlLoop         │
//! CommandInbox ─▶ │  Lid · Fill · Emptied · Report│ ──▶ EventSink
//!                 └──────────────────────────────┘
//!                                │
//!                                ▼
//!                          LidActuatorPort
//! ```
//!
//! One cycle, in order:
//!
//! 1. make sure the link is up (skip the cycle if it cannot be restored),
//!    then take at most one inbound command
//! 2. sample presence
//! 3. lid rules
//! 4. sample range, estimate fill
//! 5. emptied detection (publish event)
//! 6. publish status, always the last outbound action
//! 7. remember fill for the next cycle
//!
//! Step 8, sleeping out the rest of the period, belongs to the caller; see
//! [`remaining_budget`].

use core::time::Duration;

use log::{debug, info, warn};

use crate::config::{BinConfig, ConfigError};
use crate::control::emptied::EmptiedDetector;
use crate::control::fill::{FillEstimator, FillLevel, RangeSample};
use crate::error::{CommsError, PayloadError};
use crate::fsm::{LidController, LidState, LidTransition};

use super::commands::{CommandInbox, RemoteCommand};
use super::events::AppEvent;
use super::ports::{EventSink, LidActuatorPort, LinkPort, SensorPort};
use super::telemetry::{MessageKind, OutboundMessage, TelemetryReporter, Topics};

// ───────────────────────────────────────────────────────────────
// Retained state
// ───────────────────────────────────────────────────────────────

/// Everything that survives from one cycle to the next. A reset returns
/// this to its default: lid CLOSED, no previous fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BinState {
    lid: LidState,
    previous_fill: Option<FillLevel>,
}

impl BinState {
    pub fn lid(&self) -> LidState {
        self.lid
    }

    pub fn previous_fill(&self) -> Option<FillLevel> {
        self.previous_fill
    }
}

// ───────────────────────────────────────────────────────────────
// Cycle results
// ───────────────────────────────────────────────────────────────

/// What one completed cycle observed and did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub command: Option<RemoteCommand>,
    pub presence: bool,
    pub lid_transition: Option<LidTransition>,
    pub range: RangeSample,
    pub fill: FillLevel,
    pub emptied: bool,
    pub emptied_published: bool,
    pub status_published: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Completed(CycleReport),
    /// The link was down and reconnecting failed. Nothing was sampled,
    /// actuated or published.
    Skipped(CommsError),
}

// ───────────────────────────────────────────────────────────────
// BinControlLoop
// ───────────────────────────────────────────────────────────────

pub struct BinControlLoop {
    fill: FillEstimator,
    emptied: EmptiedDetector,
    lid: LidController,
    reporter: TelemetryReporter,
    state: BinState,
    period: Duration,
    cycle_count: u64,
}

impl BinControlLoop {
    /// Build the loop from a validated configuration.
    pub fn new(config: &BinConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let fill = FillEstimator::new(config.full_distance_mm, config.empty_distance_mm).ok_or(
            ConfigError::ValidationFailed("empty_distance_mm must exceed full_distance_mm"),
        )?;
        let topics = Topics::for_device(config.device_id.as_str())?;

        Ok(Self {
            fill,
            emptied: EmptiedDetector::new(config.drop_threshold_pct),
            lid: LidController::new(config.open_angle_deg, config.close_angle_deg),
            reporter: TelemetryReporter::new(topics),
            state: BinState::default(),
            period: Duration::from_millis(u64::from(config.cycle_period_ms)),
            cycle_count: 0,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Park the lid so the hardware matches the initial CLOSED state.
    pub fn start(&mut self, hw: &mut impl LidActuatorPort, sink: &mut impl EventSink) {
        self.lid.park(hw);
        let period_ms = self.period.as_millis() as u32;
        sink.emit(&AppEvent::Started { period_ms });
        info!("Control loop started, period {} ms", period_ms);
    }

    // ── Per-cycle orchestration ───────────────────────────────

    /// Run one full cycle.
    ///
    /// `hw` satisfies **both** [`SensorPort`] and [`LidActuatorPort`]; one
    /// value owns the pins, so one `&mut` borrow covers the whole cycle.
    pub fn run_cycle(
        &mut self,
        hw: &mut (impl SensorPort + LidActuatorPort),
        link: &mut impl LinkPort,
        inbox: &CommandInbox,
        sink: &mut impl EventSink,
    ) -> CycleOutcome {
        self.cycle_count += 1;

        // 1. Link, then inbound command
        if !link.is_connected() {
            warn!("Cycle {}: link down, reconnecting", self.cycle_count);
            if let Err(e) = link.reconnect() {
                warn!("Cycle {} skipped: {}", self.cycle_count, e);
                sink.emit(&AppEvent::CycleSkipped(e.into()));
                return CycleOutcome::Skipped(e);
            }
            info!("Link restored");
        }
        let command = inbox.take().map(|raw| raw.decode());
        if let Some(cmd) = command {
            sink.emit(&AppEvent::CommandReceived(cmd));
        }

        // 2. Presence
        let presence = hw.read_presence();

        // 3. Lid
        let lid_transition = self.lid.step(&mut self.state.lid, presence, command, hw);
        if let Some(t) = lid_transition {
            sink.emit(&AppEvent::LidMoved(t));
        }

        // 4. Fill
        let range = hw.read_range();
        let fill = self.fill.estimate(range, self.state.previous_fill);
        debug!(
            "Cycle {}: presence={} range={:?} fill={}",
            self.cycle_count, presence, range, fill
        );

        // 5. Emptied
        let emptied = match self.state.previous_fill {
            Some(previous) if self.emptied.detect(previous, fill) => {
                info!(
                    "Bin emptied: {} -> {} (threshold {}%)",
                    previous,
                    fill,
                    self.emptied.threshold_pct()
                );
                sink.emit(&AppEvent::Emptied {
                    previous,
                    current: fill,
                });
                true
            }
            _ => false,
        };
        let emptied_published = emptied
            && dispatch(
                MessageKind::Emptied,
                self.reporter.build_emptied_message(),
                link,
                sink,
            );

        // 6. Status, last outbound action of the cycle
        let lid = self.state.lid;
        let status_published = dispatch(
            MessageKind::Status,
            self.reporter.build_status_message(fill, lid.is_open()),
            link,
            sink,
        );
        sink.emit(&AppEvent::Status { fill, lid });

        // 7. Memory. A timeout before the first reading leaves it unseeded.
        if !range.is_timeout() {
            self.state.previous_fill = Some(fill);
        }

        CycleOutcome::Completed(CycleReport {
            command,
            presence,
            lid_transition,
            range,
            fill,
            emptied,
            emptied_published,
            status_published,
        })
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> &BinState {
        &self.state
    }

    pub fn topics(&self) -> &Topics {
        self.reporter.topics()
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Cycles attempted since startup, skipped ones included.
    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }
}

/// Publish a built message, or report why it could not be. Returns whether
/// the link accepted it.
fn dispatch(
    kind: MessageKind,
    built: Result<OutboundMessage<'_>, PayloadError>,
    link: &mut impl LinkPort,
    sink: &mut impl EventSink,
) -> bool {
    let msg = match built {
        Ok(msg) => msg,
        Err(e) => {
            warn!("{:?} message dropped: {}", kind, e);
            sink.emit(&AppEvent::PayloadDropped {
                kind,
                error: e.into(),
            });
            return false;
        }
    };
    match link.publish(msg.topic, &msg.payload) {
        Ok(()) => true,
        Err(e) => {
            warn!("{:?} publish to {} failed: {}", kind, msg.topic, e);
            sink.emit(&AppEvent::PublishFailed {
                kind,
                error: e.into(),
            });
            false
        }
    }
}

/// Time left in the current period after `elapsed` was spent working.
/// Zero when the cycle overran.
pub fn remaining_budget(period: Duration, elapsed: Duration) -> Duration {
    period.saturating_sub(elapsed)
}
