//! Single-LED pattern player.
//!
//! The control loop calls [`IndicatorController::advance`] once per tick;
//! each call performs at most one LED write and never sleeps.  A new
//! [`request`](IndicatorController::request) replaces the current pattern.
//!
//! ## Patterns
//!
//! | Pattern      | Behaviour                                    | Completes |
//! |--------------|----------------------------------------------|-----------|
//! | Off          | LED low                                      | at once   |
//! | FadeIn       | LED high (no analog fade on this board)      | at once   |
//! | FadeOut      | LED low                                      | at once   |
//! | PulseRapid   | toggle every `period/2`, `count` pulses      | deadline  |
//! | PulseSlow    | toggle every `period/2`                      | never     |

use log::{debug, trace, warn};
use serde::Serialize;

use crate::app::ports::{ClockPort, OutputPort};
use crate::timing::Timestamp;

/// Pattern identifier with its per-variant timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LedPattern {
    Off,
    FadeIn,
    FadeOut,
    /// Warning flash: `count` full on/off pulses of `period_ms` each.
    PulseRapid { count: u16, period_ms: u32 },
    /// Charging indicator; runs until replaced.
    PulseSlow { period_ms: u32 },
}

impl LedPattern {
    pub fn is_perpetual(self) -> bool {
        matches!(self, Self::PulseSlow { .. })
    }
}

/// Why [`IndicatorController::block_until_complete`] declined to wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockRefused {
    /// The current pattern never completes.
    Perpetual,
}

impl core::fmt::Display for BlockRefused {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Perpetual => write!(f, "pattern never completes"),
        }
    }
}

/// Playback state for the one status LED.  Stack-allocated, no heap.
#[derive(Debug)]
pub struct IndicatorController {
    pattern: LedPattern,
    brightness: bool,
    next_step: Timestamp,
    deadline: Timestamp,
    completed: bool,
}

impl Default for IndicatorController {
    fn default() -> Self {
        Self::new()
    }
}

impl IndicatorController {
    /// Starts on `Off`, not yet applied: the first advance drives the LED low.
    pub fn new() -> Self {
        Self {
            pattern: LedPattern::Off,
            brightness: false,
            next_step: Timestamp::ZERO,
            deadline: Timestamp::ZERO,
            completed: false,
        }
    }

    /// Replace the current pattern.
    ///
    /// Re-requesting `PulseSlow` while a slow pulse is already playing keeps
    /// its phase, so repeated requests every tick do not freeze the LED.
    pub fn request(&mut self, pattern: LedPattern, now: Timestamp) {
        if pattern.is_perpetual() && self.pattern.is_perpetual() {
            self.pattern = pattern;
            return;
        }

        match pattern {
            LedPattern::PulseRapid { count, period_ms } => {
                let half = period_ms / 2;
                let span = u32::from(count)
                    .saturating_mul(period_ms)
                    .saturating_add(half)
                    .min(Timestamp::MAX_SPAN_MS);
                self.next_step = now.offset(half);
                self.deadline = now.offset(span);
            }
            LedPattern::PulseSlow { period_ms } => {
                self.next_step = now.offset(period_ms / 2);
                self.deadline = now;
            }
            LedPattern::Off | LedPattern::FadeIn | LedPattern::FadeOut => {
                self.next_step = now;
                self.deadline = now;
            }
        }
        if pattern != self.pattern {
            debug!("Indicator: {:?} -> {:?}", self.pattern, pattern);
        }
        self.pattern = pattern;
        self.completed = false;
    }

    /// Run one time slice.  No-op once the pattern has completed.
    pub fn advance(&mut self, now: Timestamp, out: &mut impl OutputPort) {
        if self.completed {
            return;
        }

        match self.pattern {
            LedPattern::Off | LedPattern::FadeOut => {
                self.write(false, out);
                self.completed = true;
            }
            LedPattern::FadeIn => {
                self.write(true, out);
                self.completed = true;
            }
            LedPattern::PulseRapid { period_ms, .. } => {
                if now.is_after(self.deadline) {
                    trace!("Indicator: rapid pulse finished at {now}");
                    self.completed = true;
                } else if now.is_after(self.next_step) {
                    self.toggle(period_ms, out);
                }
            }
            LedPattern::PulseSlow { period_ms } => {
                if now.is_after(self.next_step) {
                    self.toggle(period_ms, out);
                }
            }
        }
    }

    /// Spin on [`advance`](Self::advance) until the pattern completes,
    /// pausing 1 ms between slices.  Refuses perpetual patterns.
    pub fn block_until_complete<H>(&mut self, hw: &mut H) -> Result<(), BlockRefused>
    where
        H: OutputPort + ClockPort,
    {
        if self.pattern.is_perpetual() {
            warn!("Indicator: refusing to block on {:?}", self.pattern);
            return Err(BlockRefused::Perpetual);
        }
        loop {
            let now = hw.now();
            self.advance(now, hw);
            if self.completed {
                return Ok(());
            }
            hw.pause_ms(1);
        }
    }

    pub fn pattern(&self) -> LedPattern {
        self.pattern
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Last level written to the LED.
    pub fn brightness(&self) -> bool {
        self.brightness
    }

    pub fn next_step_time(&self) -> Timestamp {
        self.next_step
    }

    pub fn deadline_time(&self) -> Timestamp {
        self.deadline
    }

    fn toggle(&mut self, period_ms: u32, out: &mut impl OutputPort) {
        self.write(!self.brightness, out);
        self.next_step = self.next_step.offset(period_ms / 2);
    }

    fn write(&mut self, level: bool, out: &mut impl OutputPort) {
        self.brightness = level;
        out.set_indicator(level);
    }
}
