//! Power-board firmware: main entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter          LogEventSink        Esp32Clock       │
//! │  (Input+Output+Clock)     (EventSink)         (ClockPort)      │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              ControlLoop (pure logic)                  │    │
//! │  │  Debouncer · PowerStateMachine · Indicator · Safety    │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Button ISR ──▶ static BUTTON (atomics)                        │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::{InputPin, OutputPin, Pin, PinDriver, Pull};
use esp_idf_hal::peripherals::Peripherals;
use log::info;

use powerboard::adapters::hardware::HardwareAdapter;
use powerboard::adapters::log_sink::LogEventSink;
use powerboard::adapters::time::Esp32Clock;
use powerboard::app::events::AppEvent;
use powerboard::app::ports::{EventSink, InputPort};
use powerboard::app::service::ControlLoop;
use powerboard::config::SystemConfig;
use powerboard::drivers::battery::BatterySensor;
use powerboard::drivers::button::BUTTON;
use powerboard::drivers::{hw_init, watchdog::Watchdog};
use powerboard::error::Error;
use powerboard::pins;

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  PowerBoard v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let config = SystemConfig::default();
    config.validate().map_err(Error::from)?;
    info!("Config: {}", serde_json::to_string(&config)?);

    // ── 3. Peripherals ────────────────────────────────────────
    hw_init::init_peripherals().map_err(Error::from)?;

    let p = Peripherals::take()?;
    let presence_pin = p.pins.gpio5.downgrade_input();
    let button_pin = p.pins.gpio4.downgrade_input();
    let indicator_pin = p.pins.gpio8.downgrade_output();
    let latch_pin = p.pins.gpio9.downgrade_output();
    let load_power_pin = p.pins.gpio10.downgrade_output();

    // The ISR is registered on `pins::BUTTON_GPIO`; the drivers must agree.
    pins::verify("presence", i32::from(presence_pin.pin()), pins::PRESENCE_GPIO)?;
    pins::verify("button", i32::from(button_pin.pin()), pins::BUTTON_GPIO)?;
    pins::verify("indicator", i32::from(indicator_pin.pin()), pins::INDICATOR_GPIO)?;
    pins::verify("latch", i32::from(latch_pin.pin()), pins::LATCH_GPIO)?;
    pins::verify("load_power", i32::from(load_power_pin.pin()), pins::LOAD_POWER_GPIO)?;

    let presence = PinDriver::input(presence_pin).map_err(|_| Error::Gpio("presence"))?;
    let mut button = PinDriver::input(button_pin).map_err(|_| Error::Gpio("button"))?;
    button.set_pull(Pull::Up).map_err(|_| Error::Gpio("button"))?;
    let indicator = PinDriver::output(indicator_pin).map_err(|_| Error::Gpio("indicator"))?;
    let latch = PinDriver::output(latch_pin).map_err(|_| Error::Gpio("latch"))?;
    let load_power = PinDriver::output(load_power_pin).map_err(|_| Error::Gpio("load_power"))?;

    let mut hw = HardwareAdapter::new(
        presence,
        button,
        indicator,
        latch,
        load_power,
        BatterySensor::default(),
        Esp32Clock::new(),
    );

    hw_init::init_isr_service().map_err(Error::from)?;
    let watchdog = Watchdog::new(config.watchdog_timeout_ms);

    // ── 4. Control loop ───────────────────────────────────────
    let mut log_sink = LogEventSink::new();
    let interval_ms = config.control_loop_interval_ms;
    let telemetry_every = config.telemetry_every_ticks();

    let initial_presence = hw.read_presence();
    let mut control = ControlLoop::new(config, &BUTTON, initial_presence);
    control.start(&mut hw, &mut log_sink);

    loop {
        control.tick(&mut hw, &mut log_sink);
        watchdog.feed();

        if control.tick_count() % telemetry_every == 0 {
            log_sink.emit(&AppEvent::Telemetry(control.status()));
        }

        FreeRtos::delay_ms(interval_ms);
    }
}

