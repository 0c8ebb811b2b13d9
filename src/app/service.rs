//! Control loop: the hexagonal core.
//!
//! [`ControlLoop`] owns the power state machine, the indicator player and
//! the safety monitor, and borrows the button debouncer (which the edge
//! ISR shares).  All I/O flows through port traits injected at call
//! sites, so the whole loop runs against mock adapters on the host.
//!
//! ```text
//!  InputPort ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                │         ControlLoop           │
//! OutputPort ◀── │ Debouncer · FSM · LED · Safety│
//!  ClockPort ──▶ └──────────────────────────────┘
//! ```

use heapless::Vec;
use log::info;

use crate::config::SystemConfig;
use crate::drivers::button::Debouncer;
use crate::drivers::indicator::IndicatorController;
use crate::fsm::{BoardState, PowerStateMachine};
use crate::safety::SafetyMonitor;
use crate::timing::Timestamp;

use super::events::{AppEvent, HISTORY_LEN, StatusSnapshot, TransitionRecord};
use super::ports::{ClockPort, EventSink, InputPort, OutputPort};

// ───────────────────────────────────────────────────────────────
// ControlLoop
// ───────────────────────────────────────────────────────────────

pub struct ControlLoop<'a> {
    button: &'a Debouncer,
    fsm: PowerStateMachine,
    indicator: IndicatorController,
    safety: SafetyMonitor,
    tick_count: u64,
    last_presence: bool,
    last_voltage: f32,
    history: Vec<TransitionRecord, HISTORY_LEN>,
}

impl<'a> ControlLoop<'a> {
    /// Construct the loop from configuration and the presence level
    /// sampled at boot.
    ///
    /// Does **not** touch the outputs: call [`start`](Self::start) next.
    pub fn new(config: SystemConfig, button: &'a Debouncer, initial_presence: bool) -> Self {
        let safety = SafetyMonitor::new(&config);
        Self {
            button,
            fsm: PowerStateMachine::new(config, initial_presence),
            indicator: IndicatorController::new(),
            safety,
            tick_count: 0,
            last_presence: initial_presence,
            last_voltage: 0.0,
            history: Vec::new(),
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Enter the initial state and show its first indicator frame.
    pub fn start(
        &mut self,
        hw: &mut (impl OutputPort + ClockPort),
        sink: &mut impl EventSink,
    ) {
        let now = hw.now();
        self.fsm.start(&mut self.indicator, hw, now);
        self.indicator.advance(now, hw);
        sink.emit(&AppEvent::Started(self.fsm.state()));
        info!("ControlLoop started in {}", self.fsm.state());
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one control cycle:
    /// presence → button → FSM → presence indicator → safety → LED.
    ///
    /// Pattern requests from the FSM steps are queued before the LED
    /// advances, so a change and its first visible step share a tick.
    pub fn tick(
        &mut self,
        hw: &mut (impl InputPort + OutputPort + ClockPort),
        sink: &mut impl EventSink,
    ) {
        self.tick_count += 1;
        let now = hw.now();

        // 1. Presence
        let presence = hw.read_presence();
        self.last_presence = presence;

        // 2. Button
        let raw_high = hw.read_raw_button();
        let pressed = self.button.poll(now, raw_high).is_some();
        if pressed {
            sink.emit(&AppEvent::PressAccepted);
        }

        // 3. FSM step
        if let Some((from, to)) = self.fsm.step(pressed, presence, &mut self.indicator, hw, now) {
            self.record(now, from, to, sink);
        }

        // 4. Presence indicator
        self.fsm
            .update_indicator_for_presence(presence, &mut self.indicator, now);

        // 5. Safety
        let voltage = hw.read_voltage();
        self.last_voltage = voltage;
        if self
            .safety
            .check(voltage, &mut self.fsm, &mut self.indicator, hw)
        {
            sink.emit(&AppEvent::EmergencyShutdown { voltage });
            self.record(hw.now(), BoardState::Active, self.fsm.state(), sink);
        }

        // 6. LED time slice (the shutdown wait may have moved the clock)
        let now = hw.now();
        self.indicator.advance(now, hw);
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn status(&self) -> StatusSnapshot {
        StatusSnapshot {
            state: self.fsm.state(),
            indicator: self.indicator.pattern(),
            indicator_completed: self.indicator.is_completed(),
            latch: self.fsm.latch(),
            load_power: self.fsm.load_power(),
            presence: self.last_presence,
            voltage: self.last_voltage,
            ticks: self.tick_count,
            safety_trips: self.safety.trips(),
            history: self.history.clone(),
        }
    }

    pub fn state(&self) -> BoardState {
        self.fsm.state()
    }

    pub fn indicator(&self) -> &IndicatorController {
        &self.indicator
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    // ── Internal ──────────────────────────────────────────────

    fn record(
        &mut self,
        at: Timestamp,
        from: BoardState,
        to: BoardState,
        sink: &mut impl EventSink,
    ) {
        if self.history.is_full() {
            self.history.remove(0);
        }
        // Cannot fail: a slot was freed above.
        let _ = self.history.push(TransitionRecord { at, from, to });
        sink.emit(&AppEvent::StateChanged { from, to });
    }
}
