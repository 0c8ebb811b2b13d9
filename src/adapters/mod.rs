//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements  | Connects to                      |
//! |------------|-------------|----------------------------------|
//! | `hardware` | InputPort   | GPIO inputs, battery ADC         |
//! |            | OutputPort  | LED, latch, load-switch GPIO     |
//! |            | ClockPort   | forwards to a clock adapter      |
//! | `log_sink` | EventSink   | Serial log output                |
//! | `time`     | ClockPort   | ESP32 system timer               |

pub mod hardware;
pub mod log_sink;
pub mod time;
