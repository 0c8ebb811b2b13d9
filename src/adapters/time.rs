//! ESP32 time adapter.
//!
//! Provides the millisecond tick and the blocking pause behind
//! [`ClockPort`].
//!
//! - **`target_os = "espidf"`**: wraps `esp_timer_get_time()` from the
//!   ESP-IDF high-resolution timer and pauses with FreeRTOS delays.
//! - **`not(target_os = "espidf")`**: uses `std::time::Instant` and
//!   `std::thread::sleep` for host-side simulation.
//!
//! Both truncate to `u32` milliseconds; the tick wraps after ~49.7 days
//! and every comparison downstream is wrap-safe.

use crate::app::ports::ClockPort;
use crate::timing::Timestamp;

/// Time adapter for the ESP32-S3 platform.
pub struct Esp32Clock {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for Esp32Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl Esp32Clock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Microseconds since boot (monotonic).
    #[cfg(target_os = "espidf")]
    fn uptime_us(&self) -> u64 {
        // SAFETY: esp_timer_get_time is a read of the running system timer.
        (unsafe { esp_idf_sys::esp_timer_get_time() }) as u64
    }

    /// Microseconds since the adapter was created (monotonic).
    #[cfg(not(target_os = "espidf"))]
    fn uptime_us(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }
}

impl ClockPort for Esp32Clock {
    fn now(&self) -> Timestamp {
        Timestamp::from_millis((self.uptime_us() / 1_000) as u32)
    }

    #[cfg(target_os = "espidf")]
    fn pause_ms(&mut self, ms: u32) {
        esp_idf_hal::delay::FreeRtos::delay_ms(ms);
    }

    #[cfg(not(target_os = "espidf"))]
    fn pause_ms(&mut self, ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
    }
}
