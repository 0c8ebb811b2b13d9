//! Low-battery safety monitor.
//!
//! Runs once per tick after the FSM step.  A single sample below the
//! threshold forces the emergency shutdown; there is no hysteresis and
//! no multi-sample confirmation, so one noisy low reading is enough.
//!
//! ## Trip sequence
//!
//! 1. `check()` sees `voltage < min_voltage`.
//! 2. [`PowerStateMachine::force_shutdown`] flashes the warning pattern,
//!    blocking until it completes.
//! 3. The FSM enters `Inactive`: load power drops, then the latch, and
//!    the board loses power.
//!
//! Outside `Active` the FSM ignores the request; the monitor only counts
//! a trip when the sequence actually ran.

use crate::app::ports::{ClockPort, OutputPort};
use crate::config::SystemConfig;
use crate::drivers::indicator::IndicatorController;
use crate::fsm::PowerStateMachine;
use log::error;

pub struct SafetyMonitor {
    min_voltage: f32,
    trips: u32,
}

impl SafetyMonitor {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            min_voltage: config.min_voltage,
            trips: 0,
        }
    }

    /// Compare one voltage sample against the threshold.
    /// Returns `true` if this call forced a shutdown.
    pub fn check<H>(
        &mut self,
        voltage: f32,
        fsm: &mut PowerStateMachine,
        indicator: &mut IndicatorController,
        hw: &mut H,
    ) -> bool
    where
        H: OutputPort + ClockPort,
    {
        // NaN compares false and is ignored.
        let below = voltage < self.min_voltage;
        if !below {
            return false;
        }
        if !fsm.force_shutdown(indicator, hw) {
            return false;
        }
        self.trips = self.trips.saturating_add(1);
        error!(
            "SAFETY: battery {:.2}V below {:.2}V, emergency shutdown",
            voltage, self.min_voltage
        );
        true
    }

    /// Shutdowns forced so far.
    pub fn trips(&self) -> u32 {
        self.trips
    }

    pub fn min_voltage(&self) -> f32 {
        self.min_voltage
    }
}
