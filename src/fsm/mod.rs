//! Function-pointer finite state machine for the board's power mode.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  StateTable                                             │
//! │  ┌──────────────────────┬──────────┬──────────────────┐ │
//! │  │ BoardState           │ on_enter │ on_update        │ │
//! │  ├──────────────────────┼──────────┼──────────────────┤ │
//! │  │ Active               │ fn(ctx)  │ fn(ctx)->Option  │ │
//! │  │ Inactive             │ fn(ctx)  │ fn(ctx)->Option  │ │
//! │  │ InactiveWithPresence │ fn(ctx)  │ fn(ctx)->Option  │ │
//! │  └──────────────────────┴──────────┴──────────────────┘ │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Each step the engine stores the tick's inputs in the [`FsmContext`]
//! and calls `on_update` for the **current** state.  If it returns
//! `Some(next)`, the engine runs `on_enter` for the next state and applies
//! the resulting [`BoardCommands`] to the outputs.  Every `on_enter` writes
//! the full set of power commands, so leaving a state needs no handler.
//! A step that computes the current state does nothing.
//!
//! Output ordering when applying commands: load power is always dropped
//! before the latch is touched, and the latch is always taken before load
//! power is raised.

pub mod context;
pub mod states;

use context::{BoardCommands, FsmContext};
use log::{error, info};
use serde::Serialize;

use crate::app::ports::{ClockPort, OutputPort};
use crate::config::SystemConfig;
use crate::drivers::indicator::{IndicatorController, LedPattern};
use crate::timing::Timestamp;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// The board's power mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum BoardState {
    /// Latch and load power asserted.
    Active = 0,
    /// Everything de-asserted.
    Inactive = 1,
    /// Load power off, latch held while external power is present.
    InactiveWithPresence = 2,
}

impl BoardState {
    /// Total number of states: used to size the table array.
    pub const COUNT: usize = 3;

    pub const ALL: [Self; Self::COUNT] = [Self::Active, Self::Inactive, Self::InactiveWithPresence];

    /// Where the board starts after power-on.  Without external power the
    /// user just pressed the button, so the latch must be taken at once.
    pub fn initial(presence: bool) -> Self {
        if presence {
            Self::InactiveWithPresence
        } else {
            Self::Active
        }
    }
}

impl core::fmt::Display for BoardState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
            Self::InactiveWithPresence => "InactiveWithPresence",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` actions.
/// These run exactly once on each state transition.
pub type StateActionFn = fn(&mut FsmContext);

/// Signature for the per-step update handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type StateUpdateFn = fn(&mut FsmContext) -> Option<BoardState>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single FSM state.
/// Stored in a fixed-size array: no heap, no `dyn`.
pub struct StateDescriptor {
    pub id: BoardState,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

// ---------------------------------------------------------------------------
// Power state machine
// ---------------------------------------------------------------------------

/// Owns the state table, the handler context and the last output levels
/// written, so callers can always see what the pins were told.
pub struct PowerStateMachine {
    table: [StateDescriptor; BoardState::COUNT],
    current: BoardState,
    ctx: FsmContext,
    latch: bool,
    load_power: bool,
    transitions: u32,
}

impl PowerStateMachine {
    /// Seed the machine from the presence level sampled at boot.
    /// Nothing touches the outputs until [`start`](Self::start).
    pub fn new(config: SystemConfig, initial_presence: bool) -> Self {
        Self {
            table: states::build_state_table(),
            current: BoardState::initial(initial_presence),
            ctx: FsmContext::new(config, initial_presence),
            latch: false,
            load_power: false,
            transitions: 0,
        }
    }

    /// Run the initial `on_enter` and drive the outputs.
    /// Call once after construction, before the first [`step`](Self::step).
    pub fn start(
        &mut self,
        indicator: &mut IndicatorController,
        out: &mut impl OutputPort,
        now: Timestamp,
    ) {
        info!("FSM starting in state: {}", self.row().name);
        let enter = self.row().on_enter;
        if let Some(enter) = enter {
            enter(&mut self.ctx);
        }
        self.apply(indicator, out, now);
    }

    /// Feed one tick's inputs.  Returns `(from, to)` when a transition fired.
    pub fn step(
        &mut self,
        pressed: bool,
        presence: bool,
        indicator: &mut IndicatorController,
        out: &mut impl OutputPort,
        now: Timestamp,
    ) -> Option<(BoardState, BoardState)> {
        self.ctx.inputs.pressed = pressed;
        self.ctx.inputs.presence = presence;

        let update = self.row().on_update;
        let next = update(&mut self.ctx)?;
        if next == self.current {
            return None;
        }
        let from = self.current;
        self.transition(next, indicator, out, now);
        Some((from, next))
    }

    /// Keep the LED in step with the presence signal.  Charging dominates;
    /// otherwise the pattern follows the current state.
    pub fn update_indicator_for_presence(
        &mut self,
        presence: bool,
        indicator: &mut IndicatorController,
        now: Timestamp,
    ) {
        let pattern = if presence {
            self.ctx.charging_pattern()
        } else {
            match self.current {
                BoardState::Active => LedPattern::FadeIn,
                BoardState::Inactive => LedPattern::FadeOut,
                // Transient: the next step moves to Inactive.
                BoardState::InactiveWithPresence => self.ctx.charging_pattern(),
            }
        };
        indicator.request(pattern, now);
    }

    /// Emergency path.  From `Active` only: flash the warning pattern,
    /// blocking until it completes, then enter `Inactive`.
    ///
    /// Returns `true` if the sequence ran.
    pub fn force_shutdown<H>(&mut self, indicator: &mut IndicatorController, hw: &mut H) -> bool
    where
        H: OutputPort + ClockPort,
    {
        if self.current != BoardState::Active {
            return false;
        }

        indicator.request(self.ctx.warning_pattern(), hw.now());
        if let Err(e) = indicator.block_until_complete(hw) {
            error!("FSM: warning flash aborted: {e}");
        }

        let now = hw.now();
        self.transition(BoardState::Inactive, indicator, hw, now);
        // Drive the LED off before the rail collapses.
        indicator.advance(now, hw);
        true
    }

    pub fn state(&self) -> BoardState {
        self.current
    }

    /// Last level written to the latch output.
    pub fn latch(&self) -> bool {
        self.latch
    }

    /// Last level written to the load-power output.
    pub fn load_power(&self) -> bool {
        self.load_power
    }

    /// Number of transitions since start.
    pub fn transition_count(&self) -> u32 {
        self.transitions
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn row(&self) -> &StateDescriptor {
        &self.table[self.current as usize]
    }

    fn transition(
        &mut self,
        next: BoardState,
        indicator: &mut IndicatorController,
        out: &mut impl OutputPort,
        now: Timestamp,
    ) {
        info!(
            "FSM transition: {} -> {}",
            self.row().name,
            self.table[next as usize].name
        );

        self.current = next;
        self.transitions = self.transitions.wrapping_add(1);

        let enter = self.row().on_enter;
        if let Some(enter) = enter {
            enter(&mut self.ctx);
        }
        self.apply(indicator, out, now);
    }

    fn apply(
        &mut self,
        indicator: &mut IndicatorController,
        out: &mut impl OutputPort,
        now: Timestamp,
    ) {
        let BoardCommands {
            latch,
            load_power,
            indicator: pattern,
        } = self.ctx.commands;

        if load_power {
            out.set_latch(latch);
            out.set_load_power(true);
        } else {
            out.set_load_power(false);
            out.set_latch(latch);
        }
        self.latch = latch;
        self.load_power = load_power;

        if let Some(pattern) = pattern {
            indicator.request(pattern, now);
        }
        self.ctx.commands.indicator = None;
    }
}
