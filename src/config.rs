//! System configuration parameters
//!
//! Every timing constant the control core uses.  There is no runtime
//! reconfiguration and no persistence: [`SystemConfig::default`] is the
//! only source of values, and the firmware logs it once at boot.

use serde::{Deserialize, Serialize};

use crate::timing::Timestamp;

/// Minimum settle time after a button edge before the press is accepted.
pub const DEBOUNCE_WINDOW_MS: u32 = 50;
/// Dead time after an accepted press before a new edge may arm.
pub const PRESS_COOLDOWN_MS: u32 = 500;

/// Low-battery warning: number of rapid pulses before power is cut.
pub const WARNING_PULSE_COUNT: u16 = 5;
/// Low-battery warning: period of one rapid pulse.
pub const WARNING_PULSE_PERIOD_MS: u32 = 400;
/// Charging indicator: period of one slow pulse.
pub const CHARGING_PULSE_PERIOD_MS: u32 = 2000;

/// Battery voltage below which the board shuts down (V).
pub const MIN_VOLTAGE: f32 = 3.3;

pub const CONTROL_LOOP_INTERVAL_MS: u32 = 10;
pub const TELEMETRY_INTERVAL_SECS: u32 = 30;
pub const WATCHDOG_TIMEOUT_MS: u32 = 10_000;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Button ---
    pub debounce_window_ms: u32,
    pub press_cooldown_ms: u32,

    // --- Indicator ---
    pub warning_pulse_count: u16,
    pub warning_pulse_period_ms: u32,
    pub charging_pulse_period_ms: u32,

    // --- Safety ---
    /// Shutdown threshold on the sensed battery voltage (V).
    pub min_voltage: f32,

    // --- Timing ---
    pub control_loop_interval_ms: u32,
    pub telemetry_interval_secs: u32,
    pub watchdog_timeout_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            debounce_window_ms: DEBOUNCE_WINDOW_MS,
            press_cooldown_ms: PRESS_COOLDOWN_MS,

            warning_pulse_count: WARNING_PULSE_COUNT,
            warning_pulse_period_ms: WARNING_PULSE_PERIOD_MS,
            charging_pulse_period_ms: CHARGING_PULSE_PERIOD_MS,

            min_voltage: MIN_VOLTAGE,

            control_loop_interval_ms: CONTROL_LOOP_INTERVAL_MS,
            telemetry_interval_secs: TELEMETRY_INTERVAL_SECS,
            watchdog_timeout_ms: WATCHDOG_TIMEOUT_MS,
        }
    }
}

impl SystemConfig {
    /// Reject values the control core cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.debounce_window_ms == 0 {
            return Err(ConfigError::ValidationFailed("debounce_window_ms must be > 0"));
        }
        // Pulse patterns step every half period.
        for period in [self.warning_pulse_period_ms, self.charging_pulse_period_ms] {
            if period < 2 || period % 2 != 0 {
                return Err(ConfigError::ValidationFailed("pulse periods must be even and >= 2 ms"));
            }
        }
        if self.warning_pulse_count == 0 {
            return Err(ConfigError::ValidationFailed("warning_pulse_count must be > 0"));
        }
        if !self.min_voltage.is_finite() || self.min_voltage <= 0.0 {
            return Err(ConfigError::ValidationFailed("min_voltage must be a positive voltage"));
        }
        if self.control_loop_interval_ms == 0
            || self.control_loop_interval_ms >= self.watchdog_timeout_ms
        {
            return Err(ConfigError::ValidationFailed(
                "control_loop_interval_ms must be non-zero and below the watchdog timeout",
            ));
        }
        // Deadlines are compared by signed difference on the wrapping tick.
        for window in [
            self.debounce_window_ms,
            self.press_cooldown_ms,
            self.charging_pulse_period_ms,
            self.watchdog_timeout_ms,
        ] {
            if window > Timestamp::MAX_SPAN_MS {
                return Err(ConfigError::ValidationFailed("timing window exceeds the tick range"));
            }
        }
        // The warning flash blocks the loop, and nothing feeds the
        // watchdog until it ends.
        match self.warning_duration_ms() {
            Some(ms) if ms < self.watchdog_timeout_ms => {}
            Some(_) => {
                return Err(ConfigError::ValidationFailed(
                    "warning flash must end before the watchdog timeout",
                ));
            }
            None => {
                return Err(ConfigError::ValidationFailed("warning flash duration overflows"));
            }
        }
        Ok(())
    }

    /// Duration of the low-battery warning sequence, end to end.
    /// `None` if it does not fit in a `u32` of milliseconds.
    pub fn warning_duration_ms(&self) -> Option<u32> {
        u32::from(self.warning_pulse_count)
            .checked_mul(self.warning_pulse_period_ms)?
            .checked_add(self.warning_pulse_period_ms / 2)
    }

    /// Control-loop ticks between telemetry snapshots, at least one.
    pub fn telemetry_every_ticks(&self) -> u64 {
        let interval = u64::from(self.control_loop_interval_ms.max(1));
        (u64::from(self.telemetry_interval_secs) * 1_000 / interval).max(1)
    }
}

/// Errors from [`SystemConfig::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}
