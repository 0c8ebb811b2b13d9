//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).
//! Telemetry is rendered as one JSON object per line.

use log::{error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(snapshot) => match serde_json::to_string(snapshot) {
                Ok(json) => info!("TELEM | {json}"),
                Err(e) => warn!("TELEM | encode failed: {e}"),
            },
            AppEvent::StateChanged { from, to } => {
                info!("STATE | {} -> {}", from, to);
            }
            AppEvent::PressAccepted => {
                info!("INPUT | press accepted");
            }
            AppEvent::EmergencyShutdown { voltage } => {
                error!("POWER | emergency shutdown at {:.2}V", voltage);
            }
            AppEvent::Started(state) => {
                info!("START | initial_state={}", state);
            }
        }
    }
}
