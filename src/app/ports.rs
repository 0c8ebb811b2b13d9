//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ControlLoop (domain)
//! ```
//!
//! Driven adapters (pins, ADC, clock, event sinks) implement these traits.
//! The [`ControlLoop`](super::service::ControlLoop) consumes them via
//! generics, so the domain core never touches hardware directly.
//!
//! Every port is infallible from the domain's point of view.  Adapters
//! that can fail must log and fall back to a conservative value.

use crate::timing::Timestamp;

// ───────────────────────────────────────────────────────────────
// Input port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: digital inputs and the battery sense line.
pub trait InputPort {
    /// `true` while an external power source is detected.
    fn read_presence(&mut self) -> bool;

    /// Current, possibly bouncing, button level.  `true` = high (released).
    fn read_raw_button(&mut self) -> bool;

    /// Battery voltage in volts, divider correction already applied.
    fn read_voltage(&mut self) -> f32;
}

// ───────────────────────────────────────────────────────────────
// Output port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the three single-bit outputs.
pub trait OutputPort {
    fn set_indicator(&mut self, on: bool);

    /// Self-hold latch for the MCU supply.
    fn set_latch(&mut self, on: bool);

    /// Load switch for the downstream device.
    fn set_load_power(&mut self, on: bool);
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic time source plus the one blocking primitive the core uses.
pub trait ClockPort {
    fn now(&self) -> Timestamp;

    /// Block the calling thread.  Only the emergency shutdown wait calls this.
    fn pause_ms(&mut self, ms: u32);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
