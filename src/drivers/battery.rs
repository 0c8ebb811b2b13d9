//! Battery voltage sense on ADC1.
//!
//! One oneshot conversion per call, no averaging: the safety monitor
//! acts on every individual sample.

use crate::drivers::hw_init;
use crate::pins;

/// Full-scale code of the 12-bit oneshot ADC.
const ADC_MAX_CODE: f32 = 4095.0;

pub struct BatterySensor {
    channel: u32,
    /// Volts per ADC count at the battery terminal.
    scale: f32,
}

impl Default for BatterySensor {
    fn default() -> Self {
        Self::new(
            pins::BATTERY_ADC_CHANNEL,
            pins::ADC_VREF,
            pins::BATTERY_DIVIDER_RATIO,
            pins::BATTERY_CORRECTION_SCALE,
        )
    }
}

impl BatterySensor {
    pub fn new(channel: u32, vref: f32, divider_ratio: f32, correction: f32) -> Self {
        Self {
            channel,
            scale: vref / ADC_MAX_CODE * divider_ratio * correction,
        }
    }

    /// Convert a raw ADC code to battery volts.
    pub fn volts_from_raw(&self, raw: u16) -> f32 {
        f32::from(raw.min(4095)) * self.scale
    }

    /// Sample the ADC once.
    pub fn read(&mut self) -> f32 {
        self.volts_from_raw(hw_init::adc1_read(self.channel))
    }
}
