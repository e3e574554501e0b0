//! GPIO assignments for the SmartBin node (ESP32 DevKit).
//!
//! Single source of truth: main builds every peripheral from these numbers.

// ---------------------------------------------------------------------------
// HC-SR04 ultrasonic ranger (mounted in the lid, facing down)
// ---------------------------------------------------------------------------

/// Digital output: 10 µs HIGH pulse starts a measurement.
pub const ULTRASONIC_TRIG_GPIO: i32 = 5;
/// Digital input: HIGH for the round-trip time. 5 V module, level-shifted.
pub const ULTRASONIC_ECHO_GPIO: i32 = 18;

// ---------------------------------------------------------------------------
// HC-SR501 PIR presence detector
// ---------------------------------------------------------------------------

/// Digital input: HIGH while motion is detected.
pub const PIR_GPIO: i32 = 23;

// ---------------------------------------------------------------------------
// Lid servo (SG90)
// ---------------------------------------------------------------------------

/// LEDC output driving the servo signal line.
pub const SERVO_PWM_GPIO: i32 = 13;
/// Standard hobby-servo frame rate. The LEDC timer runs at 14-bit
/// resolution, about 1.2 µs per step over the 20 ms frame.
pub const SERVO_PWM_FREQ_HZ: u32 = 50;
