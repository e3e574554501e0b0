//! Fill estimation from ultrasonic range samples.
//!
//! The ranger looks down from the lid at the surface of the contents:
//! a short distance means a full bin, a long one an empty bin.
//!
//! ```text
//!  distance  ≤ full ─────────── 100 %
//!            full … empty ───── linear, truncated toward zero
//!            ≥ empty ─────────── 0 %
//! ```

use core::fmt;

use serde::Serialize;

/// Speed of sound used to convert echo width into distance (m/s).
const SPEED_OF_SOUND_M_PER_S: u32 = 343;

/// One distance measurement from the ranger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeSample {
    /// Distance to the surface in millimetres.
    Distance { mm: u16 },
    /// No echo arrived within the timeout.
    NoEcho,
}

impl RangeSample {
    /// Convert an echo pulse width into a sample.
    ///
    /// The pulse covers the round trip, so distance is `width · c / 2`.
    /// A zero-width pulse carries no information and is treated as
    /// [`RangeSample::NoEcho`].
    pub fn from_echo_us(width_us: u32) -> Self {
        if width_us == 0 {
            return Self::NoEcho;
        }
        let mm = u64::from(width_us) * u64::from(SPEED_OF_SOUND_M_PER_S) / 2_000;
        Self::Distance {
            mm: mm.min(u64::from(u16::MAX)) as u16,
        }
    }

    pub fn is_timeout(self) -> bool {
        matches!(self, Self::NoEcho)
    }
}

/// Fill percentage, always within `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct FillLevel(u8);

impl FillLevel {
    pub const EMPTY: Self = Self(0);
    pub const FULL: Self = Self(100);

    /// Build a level from any integer, clamping into `0..=100`.
    pub fn clamped(percent: i32) -> Self {
        Self(percent.clamp(0, 100) as u8)
    }

    pub fn percent(self) -> u8 {
        self.0
    }
}

impl fmt::Display for FillLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Maps range samples onto [`FillLevel`]s between two reference distances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillEstimator {
    full_mm: u16,
    empty_mm: u16,
}

impl FillEstimator {
    /// `full_mm` must be strictly less than `empty_mm`; returns `None`
    /// otherwise (the map would be degenerate or inverted).
    pub fn new(full_mm: u16, empty_mm: u16) -> Option<Self> {
        (full_mm < empty_mm).then_some(Self { full_mm, empty_mm })
    }

    /// Estimate the current fill.
    ///
    /// A timed-out sample carries no new information: the previous level is
    /// returned unchanged, or [`FillLevel::EMPTY`] before the first valid
    /// reading.
    pub fn estimate(&self, sample: RangeSample, previous: Option<FillLevel>) -> FillLevel {
        match sample {
            RangeSample::NoEcho => previous.unwrap_or(FillLevel::EMPTY),
            RangeSample::Distance { mm } => self.level_at(mm),
        }
    }

    /// Pure linear map from distance to fill.
    pub fn level_at(&self, mm: u16) -> FillLevel {
        if mm <= self.full_mm {
            return FillLevel::FULL;
        }
        if mm >= self.empty_mm {
            return FillLevel::EMPTY;
        }
        let span = i32::from(self.empty_mm) - i32::from(self.full_mm);
        let headroom = i32::from(self.empty_mm) - i32::from(mm);
        FillLevel::clamped(headroom * 100 / span)
    }
}
