//! Fuzz target: `FillEstimator` and `EmptiedDetector`
//!
//! Arbitrary calibrations, echo widths and previous levels must never
//! panic and never produce a fill outside 0-100.
//!
//! cargo fuzz run fuzz_fill_estimator

#![no_main]

use libfuzzer_sys::fuzz_target;
use smartbin::control::emptied::EmptiedDetector;
use smartbin::control::fill::{FillEstimator, FillLevel, RangeSample};

fuzz_target!(|data: &[u8]| {
    if data.len() < 10 {
        return;
    }
    let full = u16::from_le_bytes([data[0], data[1]]);
    let empty = u16::from_le_bytes([data[2], data[3]]);
    let echo_us = u32::from_le_bytes([data[4], data[5], data[6], data[7]]);
    let previous = FillLevel::clamped(i32::from(data[8]));
    let threshold = data[9];

    let Some(est) = FillEstimator::new(full, empty) else {
        assert!(empty <= full, "valid calibration rejected");
        return;
    };

    let sample = RangeSample::from_echo_us(echo_us);
    let fill = est.estimate(sample, Some(previous));
    assert!(fill.percent() <= 100);
    if sample.is_timeout() {
        assert_eq!(fill, previous);
    }

    let fired = EmptiedDetector::new(threshold).detect(previous, fill);
    assert_eq!(
        fired,
        i16::from(previous.percent()) - i16::from(fill.percent()) > i16::from(threshold)
    );
});
