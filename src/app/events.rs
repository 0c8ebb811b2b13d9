//! Outbound application events.
//!
//! The [`ControlLoop`](super::service::ControlLoop) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them.

use heapless::Vec;
use serde::Serialize;

use crate::drivers::indicator::LedPattern;
use crate::fsm::BoardState;
use crate::timing::Timestamp;

/// Transitions kept in [`StatusSnapshot::history`].
pub const HISTORY_LEN: usize = 8;

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The control loop has started (carries initial state).
    Started(BoardState),

    /// A debounced button press was consumed.
    PressAccepted,

    /// The FSM transitioned between states.
    StateChanged { from: BoardState, to: BoardState },

    /// The safety monitor forced a shutdown at this voltage.
    EmergencyShutdown { voltage: f32 },

    /// Periodic telemetry snapshot.
    Telemetry(StatusSnapshot),
}

/// One realised FSM transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TransitionRecord {
    pub at: Timestamp,
    pub from: BoardState,
    pub to: BoardState,
}

/// A point-in-time view of the board suitable for logging.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSnapshot {
    pub state: BoardState,
    pub indicator: LedPattern,
    pub indicator_completed: bool,
    pub latch: bool,
    pub load_power: bool,
    pub presence: bool,
    pub voltage: f32,
    pub ticks: u64,
    pub safety_trips: u32,
    /// Most recent transitions, oldest first.
    pub history: Vec<TransitionRecord, HISTORY_LEN>,
}
