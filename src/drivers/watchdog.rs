//! Task watchdog (TWDT).
//!
//! The control loop feeds it once per cycle. A reconnect that blocks far
//! longer than the broker timeout, or a wedged driver, resets the node
//! into its documented power-on state (lid CLOSED, no previous fill).

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::{
    esp_task_wdt_add, esp_task_wdt_config_t, esp_task_wdt_reconfigure, esp_task_wdt_reset, ESP_OK,
};
use log::{info, warn};

pub struct Watchdog {
    armed: bool,
    timeout_ms: u32,
}

impl Watchdog {
    /// Subscribe the calling task with the given timeout.
    pub fn arm(timeout_ms: u32) -> Self {
        #[cfg(target_os = "espidf")]
        let armed = unsafe {
            let cfg = esp_task_wdt_config_t {
                timeout_ms,
                idle_core_mask: 0,
                trigger_panic: true,
            };
            let ret = esp_task_wdt_reconfigure(&cfg);
            if ret != ESP_OK {
                warn!("Watchdog: reconfigure returned {}", ret);
            }
            let ret = esp_task_wdt_add(core::ptr::null_mut());
            if ret != ESP_OK {
                warn!("Watchdog: subscribe failed ({})", ret);
            }
            ret == ESP_OK
        };

        #[cfg(not(target_os = "espidf"))]
        let armed = {
            warn!("Watchdog(sim): not armed");
            false
        };

        if armed {
            info!("Watchdog: armed, {} ms", timeout_ms);
        }
        Self { armed, timeout_ms }
    }

    pub fn feed(&self) {
        #[cfg(target_os = "espidf")]
        {
            if self.armed {
                unsafe {
                    esp_task_wdt_reset();
                }
            }
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }
}
