//! Low-battery shutdown through the full control loop.

use super::mock_hw::{MockBoard, OutputCall, RecordingSink};

use powerboard::app::events::AppEvent;
use powerboard::app::service::ControlLoop;
use powerboard::config::{MIN_VOLTAGE, SystemConfig};
use powerboard::drivers::button::Debouncer;
use powerboard::drivers::indicator::LedPattern;
use powerboard::fsm::BoardState;

fn started<'a>(
    button: &'a Debouncer,
    hw: &mut MockBoard,
    sink: &mut RecordingSink,
) -> ControlLoop<'a> {
    let mut ctl = ControlLoop::new(SystemConfig::default(), button, hw.presence);
    ctl.start(hw, sink);
    ctl
}

#[test]
fn low_battery_while_active_powers_down() {
    let button = Debouncer::new(50, 500);
    let mut hw = MockBoard::new();
    let mut sink = RecordingSink::new();
    let mut ctl = started(&button, &mut hw, &mut sink);
    hw.calls.clear();

    hw.voltage = MIN_VOLTAGE - 0.2;
    hw.advance(10);
    ctl.tick(&mut hw, &mut sink);

    assert_eq!(ctl.state(), BoardState::Inactive);
    assert_eq!(ctl.indicator().pattern(), LedPattern::FadeOut);
    assert!(ctl.indicator().is_completed());
    assert_eq!(hw.load_power(), Some(false));
    assert_eq!(hw.latch(), Some(false));
    assert_eq!(hw.led(), Some(false));
    assert_eq!(
        hw.power_calls(),
        vec![OutputCall::LoadPower(false), OutputCall::Latch(false)]
    );

    // Warning flash: five pulses, then the LED goes dark.
    let flashes: Vec<bool> = hw
        .calls
        .iter()
        .filter_map(|c| match c {
            OutputCall::Indicator(on) => Some(*on),
            _ => None,
        })
        .collect();
    assert_eq!(flashes.iter().filter(|on| **on).count(), 5);
    assert!(hw.paused_ms > 5 * 400 + 200);
    assert!(hw.paused_ms < 5 * 400 + 200 + 50);

    let shutdown_at = sink
        .events
        .iter()
        .position(|e| matches!(e, AppEvent::EmergencyShutdown { .. }));
    let changed_at = sink
        .events
        .iter()
        .position(|e| matches!(e, AppEvent::StateChanged { .. }));
    assert!(shutdown_at.is_some());
    assert!(shutdown_at < changed_at);
    assert_eq!(ctl.status().safety_trips, 1);
}

#[test]
fn low_battery_with_presence_still_releases_latch() {
    let button = Debouncer::new(50, 500);
    let mut hw = MockBoard::new();
    let mut sink = RecordingSink::new();
    let mut ctl = started(&button, &mut hw, &mut sink);

    hw.presence = true;
    hw.voltage = 3.0;
    hw.advance(10);
    ctl.tick(&mut hw, &mut sink);

    assert_eq!(ctl.state(), BoardState::Inactive);
    assert_eq!(hw.latch(), Some(false));
}

#[test]
fn low_battery_while_inactive_does_not_block() {
    let button = Debouncer::new(50, 500);
    let mut hw = MockBoard::new().with_presence(true);
    let mut sink = RecordingSink::new();
    let mut ctl = started(&button, &mut hw, &mut sink);

    hw.voltage = 2.5;
    for _ in 0..5 {
        hw.advance(10);
        ctl.tick(&mut hw, &mut sink);
    }

    assert_eq!(ctl.state(), BoardState::InactiveWithPresence);
    assert_eq!(hw.paused_ms, 0);
    assert_eq!(ctl.status().safety_trips, 0);
    assert!(
        !sink
            .events
            .iter()
            .any(|e| matches!(e, AppEvent::EmergencyShutdown { .. }))
    );
}

#[test]
fn threshold_voltage_is_healthy() {
    let button = Debouncer::new(50, 500);
    let mut hw = MockBoard::new();
    let mut sink = RecordingSink::new();
    let mut ctl = started(&button, &mut hw, &mut sink);

    hw.voltage = MIN_VOLTAGE;
    hw.advance(10);
    ctl.tick(&mut hw, &mut sink);

    assert_eq!(ctl.state(), BoardState::Active);
    assert_eq!(hw.paused_ms, 0);
}

#[test]
fn single_noisy_sample_is_enough() {
    let button = Debouncer::new(50, 500);
    let mut hw = MockBoard::new();
    let mut sink = RecordingSink::new();
    let mut ctl = started(&button, &mut hw, &mut sink);

    for _ in 0..20 {
        hw.advance(10);
        ctl.tick(&mut hw, &mut sink);
    }
    hw.voltage = 0.0;
    hw.advance(10);
    ctl.tick(&mut hw, &mut sink);
    hw.voltage = 4.0;
    hw.advance(10);
    ctl.tick(&mut hw, &mut sink);

    assert_eq!(ctl.state(), BoardState::Inactive);
    let status = ctl.status();
    assert_eq!(status.history.len(), 1);
    assert_eq!(status.history[0].from, BoardState::Active);
    assert_eq!(status.history[0].to, BoardState::Inactive);
}

#[test]
fn press_after_shutdown_reactivates() {
    let button = Debouncer::new(50, 500);
    let mut hw = MockBoard::new();
    let mut sink = RecordingSink::new();
    let mut ctl = started(&button, &mut hw, &mut sink);

    hw.voltage = 3.0;
    hw.advance(10);
    ctl.tick(&mut hw, &mut sink);
    assert_eq!(ctl.state(), BoardState::Inactive);

    // Battery swapped while the rail was briefly held.
    hw.voltage = 4.1;
    hw.press(&button);
    for _ in 0..6 {
        hw.advance(10);
        ctl.tick(&mut hw, &mut sink);
    }
    assert_eq!(ctl.state(), BoardState::Active);
    assert_eq!(hw.latch(), Some(true));
    assert_eq!(hw.load_power(), Some(true));
}
