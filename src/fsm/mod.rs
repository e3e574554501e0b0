//! Lid state machine.
//!
//! ```text
//!            remote OPEN  /  presence ∧ CLOSED
//!   ┌────────┐ ─────────────────────────────▶ ┌──────┐
//!   │ CLOSED │                                 │ OPEN │
//!   └────────┘ ◀───────────────────────────── └──────┘
//!            remote CLOSE / ¬presence ∧ OPEN
//! ```
//!
//! Rules are evaluated once per cycle in priority order:
//!
//! 1. remote `OPEN`  → OPEN, regardless of presence
//! 2. remote `CLOSE` → CLOSED, regardless of presence
//! 3. presence while CLOSED → OPEN
//! 4. no presence while OPEN → CLOSED
//! 5. otherwise nothing
//!
//! An `UNKNOWN` remote command is dropped before rule 1 and evaluation
//! continues with rules 3–5 as if no command had arrived.
//!
//! Each returned [`LidTransition`] corresponds to exactly one actuator write;
//! `None` means no write was issued. The actuator has no position feedback,
//! so writes are fire-and-forget.

use log::{debug, info};

use crate::app::commands::RemoteCommand;
use crate::app::ports::LidActuatorPort;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LidState {
    #[default]
    Closed,
    Open,
}

impl LidState {
    pub fn is_open(self) -> bool {
        self == Self::Open
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Closed => "CLOSED",
            Self::Open => "OPEN",
        }
    }
}

/// What caused an actuator write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionCause {
    /// Explicit `OPEN` / `CLOSE` from the controller topic.
    Remote,
    /// Presence sensor edge.
    Presence,
}

/// One actuator write. A remote command yields one even when the lid is
/// already in the commanded state (`from == to`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LidTransition {
    pub from: LidState,
    pub to: LidState,
    pub cause: TransitionCause,
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Stateless rule engine; the [`LidState`] it drives lives in the
/// orchestrator's state struct and is passed in by reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LidController {
    open_angle: u8,
    close_angle: u8,
}

impl LidController {
    pub fn new(open_angle: u8, close_angle: u8) -> Self {
        Self {
            open_angle,
            close_angle,
        }
    }

    /// Drive the lid to the closed angle at boot. `LidState` starts CLOSED,
    /// this makes the hardware agree with it.
    pub fn park(&self, actuator: &mut impl LidActuatorPort) {
        info!("Lid parked at {} deg", self.close_angle);
        actuator.set_lid_angle(self.close_angle);
    }

    /// Evaluate one cycle.
    pub fn step(
        &self,
        state: &mut LidState,
        presence: bool,
        command: Option<RemoteCommand>,
        actuator: &mut impl LidActuatorPort,
    ) -> Option<LidTransition> {
        let target = match command {
            Some(RemoteCommand::Open) => {
                return Some(self.apply(state, LidState::Open, TransitionCause::Remote, actuator));
            }
            Some(RemoteCommand::Close) => {
                return Some(self.apply(state, LidState::Closed, TransitionCause::Remote, actuator));
            }
            Some(RemoteCommand::Unknown) => {
                debug!("Lid: ignoring unknown remote command");
                presence_target(*state, presence)
            }
            None => presence_target(*state, presence),
        }?;

        Some(self.apply(state, target, TransitionCause::Presence, actuator))
    }

    pub fn angle_for(&self, state: LidState) -> u8 {
        match state {
            LidState::Open => self.open_angle,
            LidState::Closed => self.close_angle,
        }
    }

    fn apply(
        &self,
        state: &mut LidState,
        to: LidState,
        cause: TransitionCause,
        actuator: &mut impl LidActuatorPort,
    ) -> LidTransition {
        let from = *state;
        actuator.set_lid_angle(self.angle_for(to));
        *state = to;
        info!("Lid transition: {} -> {} ({:?})", from.name(), to.name(), cause);
        LidTransition { from, to, cause }
    }
}

/// Rules 3–5.
fn presence_target(state: LidState, presence: bool) -> Option<LidState> {
    match (state, presence) {
        (LidState::Closed, true) => Some(LidState::Open),
        (LidState::Open, false) => Some(LidState::Closed),
        _ => None,
    }
}
