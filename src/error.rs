//! Unified error types for the power-board firmware.
//!
//! The control core itself is total and never returns errors.  Only
//! hardware bring-up and configuration validation can fail, and both
//! funnel into this `Copy` enum so `main` can propagate them with `?`.

use core::fmt;

use crate::config::ConfigError;
use crate::drivers::hw_init::HwInitError;

/// Every fallible bring-up operation funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Peripheral initialisation failed.
    Init(HwInitError),
    /// Configuration failed validation.
    Config(ConfigError),
    /// A GPIO driver could not be created for the named signal.
    Gpio(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init(e) => write!(f, "init: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Gpio(signal) => write!(f, "gpio: cannot drive {signal}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<HwInitError> for Error {
    fn from(e: HwInitError) -> Self {
        Self::Init(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}
