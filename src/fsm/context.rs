//! Shared mutable context threaded through every FSM handler.
//!
//! `FsmContext` is the single struct that state handlers read from and
//! write to: the inputs sampled this tick, the output commands the
//! handlers request, and the configuration.  Handlers never touch
//! hardware; the engine applies [`BoardCommands`] after each transition.

use crate::config::SystemConfig;
use crate::drivers::indicator::LedPattern;

// ---------------------------------------------------------------------------
// Inputs (written by the engine before each update; read by handlers)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FsmInputs {
    /// A validated press was consumed this tick.
    pub pressed: bool,
    /// External power source detected.
    pub presence: bool,
}

// ---------------------------------------------------------------------------
// Output commands (written by handlers; applied by the engine)
// ---------------------------------------------------------------------------

/// Requested output levels.  The engine writes them to the output port in
/// a fixed order and forwards `indicator`, if set, to the LED controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoardCommands {
    pub latch: bool,
    pub load_power: bool,
    /// One-shot pattern request; taken by the engine when applied.
    pub indicator: Option<LedPattern>,
}

impl BoardCommands {
    /// Everything de-asserted, no pattern change.
    pub fn all_off() -> Self {
        Self::default()
    }
}

// ---------------------------------------------------------------------------
// FsmContext
// ---------------------------------------------------------------------------

pub struct FsmContext {
    pub inputs: FsmInputs,
    pub commands: BoardCommands,
    pub config: SystemConfig,
}

impl FsmContext {
    pub fn new(config: SystemConfig, presence: bool) -> Self {
        Self {
            inputs: FsmInputs {
                pressed: false,
                presence,
            },
            commands: BoardCommands::all_off(),
            config,
        }
    }

    /// Slow pulse at the configured charging period.
    pub fn charging_pattern(&self) -> LedPattern {
        LedPattern::PulseSlow {
            period_ms: self.config.charging_pulse_period_ms,
        }
    }

    /// Rapid pulse at the configured low-battery warning cadence.
    pub fn warning_pattern(&self) -> LedPattern {
        LedPattern::PulseRapid {
            count: self.config.warning_pulse_count,
            period_ms: self.config.warning_pulse_period_ms,
        }
    }
}
