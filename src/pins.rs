//! GPIO / peripheral pin assignments for the power-management board.
//!
//! The ISR is registered on [`BUTTON_GPIO`], and `main` checks every
//! `PinDriver` it creates against these numbers with [`verify`] before
//! the control loop starts.  Moving a pin means changing it here and at
//! the matching `Peripherals` field, or boot stops with a GPIO error.

use log::error;

use crate::error::Error;

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Momentary push-button, external pull-up.  The ISR arms on the falling
/// edge and the press is confirmed once the level has settled low.
pub const BUTTON_GPIO: i32 = 4;

/// Charger / external supply detect.  HIGH = auxiliary power present.
pub const PRESENCE_GPIO: i32 = 5;

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// Status LED (active HIGH).
pub const INDICATOR_GPIO: i32 = 8;

/// Self-hold latch keeping the MCU rail up independently of the button.
pub const LATCH_GPIO: i32 = 9;

/// Load switch gating power to the downstream device.
pub const LOAD_POWER_GPIO: i32 = 10;

// ---------------------------------------------------------------------------
// Battery sense (ADC1)
// ---------------------------------------------------------------------------

/// Battery voltage through a resistive divider.
/// ADC1 channel 1 (GPIO 2 on ESP32-S3).
pub const BATTERY_ADC_CHANNEL: u32 = 1;

/// Full-scale ADC input with 12 dB attenuation (V).
pub const ADC_VREF: f32 = 3.1;
/// Battery divider: 100k over 100k.
pub const BATTERY_DIVIDER_RATIO: f32 = 2.0;
/// Board-level gain correction, determined on the bench.
pub const BATTERY_CORRECTION_SCALE: f32 = 1.0;

/// Check that the GPIO actually wired for `role` is its assignment here.
pub fn verify(role: &'static str, actual: i32, expected: i32) -> Result<(), Error> {
    if actual == expected {
        Ok(())
    } else {
        error!("pins: {role} wired to GPIO{actual}, expected GPIO{expected}");
        Err(Error::Gpio(role))
    }
}
