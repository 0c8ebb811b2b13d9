//! Input and output drivers, hardware initialisation, and peripheral helpers.

pub mod battery;
pub mod button;
pub mod hw_init;
pub mod indicator;
pub mod watchdog;
