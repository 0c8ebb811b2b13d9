//! Concrete state handler functions and table builder.
//!
//! Each state is defined by plain `fn` pointers: no closures, no
//! dynamic dispatch, no heap.
//!
//! ```text
//!  ACTIVE ──[press, presence]──────────▶ INACTIVE_WITH_PRESENCE
//!  ACTIVE ──[press, no presence]───────▶ INACTIVE
//!  INACTIVE / INACTIVE_WITH_PRESENCE ──[press]──▶ ACTIVE
//!  INACTIVE ──[presence]───────────────▶ INACTIVE_WITH_PRESENCE
//!  INACTIVE_WITH_PRESENCE ──[presence lost]──▶ INACTIVE
//! ```

use super::context::FsmContext;
use super::{BoardState, StateDescriptor};
use crate::drivers::indicator::LedPattern;
use log::info;

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; BoardState::COUNT] {
    [
        // Index 0: Active
        StateDescriptor {
            id: BoardState::Active,
            name: "Active",
            on_enter: Some(active_enter),
            on_update: active_update,
        },
        // Index 1: Inactive
        StateDescriptor {
            id: BoardState::Inactive,
            name: "Inactive",
            on_enter: Some(inactive_enter),
            on_update: inactive_update,
        },
        // Index 2: InactiveWithPresence
        StateDescriptor {
            id: BoardState::InactiveWithPresence,
            name: "InactiveWithPresence",
            on_enter: Some(inactive_with_presence_enter),
            on_update: inactive_with_presence_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  Transition function
// ═══════════════════════════════════════════════════════════════════════════

/// Total transition function over `(state, pressed, presence)`.
pub fn next_state(from: BoardState, pressed: bool, presence: bool) -> BoardState {
    use BoardState::*;
    match (from, pressed, presence) {
        (Active, true, true) => InactiveWithPresence,
        (Active, true, false) => Inactive,
        (Active, false, _) => Active,

        (Inactive | InactiveWithPresence, true, _) => Active,
        (Inactive | InactiveWithPresence, false, true) => InactiveWithPresence,
        (Inactive | InactiveWithPresence, false, false) => Inactive,
    }
}

fn leave(from: BoardState, ctx: &FsmContext) -> Option<BoardState> {
    let next = next_state(from, ctx.inputs.pressed, ctx.inputs.presence);
    (next != from).then_some(next)
}

// ═══════════════════════════════════════════════════════════════════════════
//  ACTIVE: latch held, load powered
// ═══════════════════════════════════════════════════════════════════════════

fn active_enter(ctx: &mut FsmContext) {
    ctx.commands.latch = true;
    ctx.commands.load_power = true;
    ctx.commands.indicator = Some(LedPattern::FadeIn);
    info!("ACTIVE: latch held, load powered");
}

fn active_update(ctx: &mut FsmContext) -> Option<BoardState> {
    leave(BoardState::Active, ctx)
}

// ═══════════════════════════════════════════════════════════════════════════
//  INACTIVE: everything released; the board powers down
// ═══════════════════════════════════════════════════════════════════════════

fn inactive_enter(ctx: &mut FsmContext) {
    ctx.commands.load_power = false;
    ctx.commands.latch = false;
    ctx.commands.indicator = Some(LedPattern::FadeOut);
    info!("INACTIVE: load off, latch released");
}

fn inactive_update(ctx: &mut FsmContext) -> Option<BoardState> {
    leave(BoardState::Inactive, ctx)
}

// ═══════════════════════════════════════════════════════════════════════════
//  INACTIVE_WITH_PRESENCE: load off, MCU kept alive on external power
// ═══════════════════════════════════════════════════════════════════════════

fn inactive_with_presence_enter(ctx: &mut FsmContext) {
    ctx.commands.load_power = false;
    ctx.commands.latch = true;
    ctx.commands.indicator = Some(LedPattern::FadeOut);
    info!("INACTIVE_WITH_PRESENCE: load off, latch held on external power");
}

fn inactive_with_presence_update(ctx: &mut FsmContext) -> Option<BoardState> {
    leave(BoardState::InactiveWithPresence, ctx)
}
