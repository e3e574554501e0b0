//! Emptied-bin detection.
//!
//! A bin fills gradually but is emptied all at once, so a single-cycle drop
//! larger than the threshold is read as a collection. The comparison is a
//! bare threshold: no smoothing or hysteresis.

use super::fill::FillLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptiedDetector {
    threshold_pct: u8,
}

impl EmptiedDetector {
    pub fn new(threshold_pct: u8) -> Self {
        Self { threshold_pct }
    }

    /// True iff fill dropped by strictly more than the threshold.
    pub fn detect(&self, previous: FillLevel, current: FillLevel) -> bool {
        let drop = i16::from(previous.percent()) - i16::from(current.percent());
        drop > i16::from(self.threshold_pct)
    }

    pub fn threshold_pct(&self) -> u8 {
        self.threshold_pct
    }
}
