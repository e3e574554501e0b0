//! Monotonic clock adapter.
//!
//! - **`target_os = "espidf"`**: `esp_timer_get_time()`, the ESP-IDF
//!   high-resolution timer (microsecond precision, monotonic since boot).
//! - **`not(target_os = "espidf")`**: `std::time::Instant` for host runs.
//!
//! `Copy`, so the ranging driver and the cycle budget can each hold one.

use crate::app::ports::TimePort;

#[derive(Debug, Clone, Copy)]
pub struct Esp32TimeAdapter {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for Esp32TimeAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl Esp32TimeAdapter {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Time since `since_us`, as a `Duration`. Saturates at zero.
    pub fn elapsed_since(&self, since_us: u64) -> core::time::Duration {
        core::time::Duration::from_micros(self.uptime_us().saturating_sub(since_us))
    }
}

impl TimePort for Esp32TimeAdapter {
    #[cfg(target_os = "espidf")]
    fn uptime_us(&self) -> u64 {
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64
    }

    #[cfg(not(target_os = "espidf"))]
    fn uptime_us(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }
}
