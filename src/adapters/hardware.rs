//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the digital pins, the battery sensor and the clock, exposing them
//! through [`InputPort`], [`OutputPort`] and [`ClockPort`].  This is the
//! only module in the system that touches actual hardware.  Pins are any
//! `embedded-hal` 1.0 digital pins: `esp-idf-hal` `PinDriver`s on the
//! board, plain structs in host tests.
//!
//! Pin errors never reach the domain.  They are logged and replaced by
//! the value that keeps the board conservative: no presence, button
//! released, output write skipped.

use embedded_hal::digital::{InputPin, OutputPin};
use log::warn;

use crate::app::ports::{ClockPort, InputPort, OutputPort};
use crate::drivers::battery::BatterySensor;
use crate::timing::Timestamp;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<I, O, C> {
    presence: I,
    button: I,
    indicator: O,
    latch: O,
    load_power: O,
    battery: BatterySensor,
    clock: C,
}

impl<I, O, C> HardwareAdapter<I, O, C>
where
    I: InputPin,
    O: OutputPin,
    C: ClockPort,
{
    pub fn new(
        presence: I,
        button: I,
        indicator: O,
        latch: O,
        load_power: O,
        battery: BatterySensor,
        clock: C,
    ) -> Self {
        Self {
            presence,
            button,
            indicator,
            latch,
            load_power,
            battery,
            clock,
        }
    }
}

fn drive<P: OutputPin>(pin: &mut P, on: bool, signal: &'static str) {
    let res = if on { pin.set_high() } else { pin.set_low() };
    if let Err(e) = res {
        warn!("hw: cannot drive {signal} {}: {e:?}", if on { "high" } else { "low" });
    }
}

// ── InputPort implementation ──────────────────────────────────

impl<I, O, C> InputPort for HardwareAdapter<I, O, C>
where
    I: InputPin,
    O: OutputPin,
    C: ClockPort,
{
    fn read_presence(&mut self) -> bool {
        self.presence.is_high().unwrap_or_else(|e| {
            warn!("hw: presence read failed: {e:?}");
            false
        })
    }

    fn read_raw_button(&mut self) -> bool {
        self.button.is_high().unwrap_or_else(|e| {
            warn!("hw: button read failed: {e:?}");
            true
        })
    }

    fn read_voltage(&mut self) -> f32 {
        self.battery.read()
    }
}

// ── OutputPort implementation ─────────────────────────────────

impl<I, O, C> OutputPort for HardwareAdapter<I, O, C>
where
    I: InputPin,
    O: OutputPin,
    C: ClockPort,
{
    fn set_indicator(&mut self, on: bool) {
        drive(&mut self.indicator, on, "indicator");
    }

    fn set_latch(&mut self, on: bool) {
        drive(&mut self.latch, on, "latch");
    }

    fn set_load_power(&mut self, on: bool) {
        drive(&mut self.load_power, on, "load_power");
    }
}

// ── ClockPort implementation ──────────────────────────────────

impl<I, O, C> ClockPort for HardwareAdapter<I, O, C>
where
    I: InputPin,
    O: OutputPin,
    C: ClockPort,
{
    fn now(&self) -> Timestamp {
        self.clock.now()
    }

    fn pause_ms(&mut self, ms: u32) {
        self.clock.pause_ms(ms);
    }
}
