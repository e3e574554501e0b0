//! Integration test driver for the `tests/integration/` submodules.
//!
//! Each `mod` below maps to a file that exercises a slice of the node
//! against mock adapters. All tests run on the host with no real hardware.

mod control_loop_tests;
mod mock_hw;

// Host critical-section implementation for the command inbox.
use critical_section as _;
