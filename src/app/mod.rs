//! Application core: pure domain logic, zero I/O.
//!
//! The control loop for the power board: button debouncing, power
//! state, indicator playback and the low-battery check.  All interaction
//! with hardware happens through **port traits** defined in [`ports`],
//! keeping this layer fully testable without real peripherals.

pub mod events;
pub mod ports;
pub mod service;
