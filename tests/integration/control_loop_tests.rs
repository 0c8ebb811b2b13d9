//! Integration tests for the ControlLoop → Debouncer/FSM/Indicator pipeline.
//!
//! These run on the host (x86_64) and drive the full tick sequence
//! against the recording mock board.

use super::mock_hw::{MockBoard, OutputCall, RecordingSink};

use powerboard::app::events::{AppEvent, HISTORY_LEN};
use powerboard::app::service::ControlLoop;
use powerboard::config::SystemConfig;
use powerboard::drivers::button::Debouncer;
use powerboard::drivers::indicator::LedPattern;
use powerboard::fsm::BoardState;

const TICK_MS: u32 = 10;

fn started<'a>(
    button: &'a Debouncer,
    hw: &mut MockBoard,
    sink: &mut RecordingSink,
) -> ControlLoop<'a> {
    let presence = hw.presence;
    let mut ctl = ControlLoop::new(SystemConfig::default(), button, presence);
    ctl.start(hw, sink);
    ctl
}

fn run(ctl: &mut ControlLoop<'_>, hw: &mut MockBoard, sink: &mut RecordingSink, ms: u32) {
    for _ in 0..ms / TICK_MS {
        hw.advance(TICK_MS);
        ctl.tick(hw, sink);
    }
}

fn button() -> Debouncer {
    Debouncer::new(50, 500)
}

// ── Startup ───────────────────────────────────────────────────

#[test]
fn boots_active_and_takes_latch_first() {
    let button = button();
    let mut hw = MockBoard::new();
    let mut sink = RecordingSink::new();
    let ctl = started(&button, &mut hw, &mut sink);

    assert_eq!(ctl.state(), BoardState::Active);
    assert_eq!(
        hw.calls,
        vec![
            OutputCall::Latch(true),
            OutputCall::LoadPower(true),
            OutputCall::Indicator(true),
        ]
    );
    assert!(matches!(sink.events[0], AppEvent::Started(BoardState::Active)));
}

#[test]
fn boots_inactive_on_external_power() {
    let button = button();
    let mut hw = MockBoard::new().with_presence(true);
    let mut sink = RecordingSink::new();
    let mut ctl = started(&button, &mut hw, &mut sink);

    assert_eq!(ctl.state(), BoardState::InactiveWithPresence);
    assert_eq!(hw.latch(), Some(true));
    assert_eq!(hw.load_power(), Some(false));

    run(&mut ctl, &mut hw, &mut sink, TICK_MS);
    assert_eq!(
        ctl.indicator().pattern(),
        LedPattern::PulseSlow { period_ms: 2000 }
    );
}

// ── Button ────────────────────────────────────────────────────

#[test]
fn press_turns_board_off() {
    let button = button();
    let mut hw = MockBoard::new();
    let mut sink = RecordingSink::new();
    let mut ctl = started(&button, &mut hw, &mut sink);

    hw.press(&button);
    run(&mut ctl, &mut hw, &mut sink, 60);

    assert_eq!(ctl.state(), BoardState::Inactive);
    assert_eq!(sink.presses(), 1);
    assert_eq!(
        sink.transitions(),
        vec![(BoardState::Active, BoardState::Inactive)]
    );
    assert_eq!(
        hw.power_calls(),
        vec![
            OutputCall::Latch(true),
            OutputCall::LoadPower(true),
            OutputCall::LoadPower(false),
            OutputCall::Latch(false),
        ]
    );
    assert_eq!(hw.led(), Some(false));
}

#[test]
fn press_within_debounce_window_is_not_accepted_yet() {
    let button = button();
    let mut hw = MockBoard::new();
    let mut sink = RecordingSink::new();
    let mut ctl = started(&button, &mut hw, &mut sink);

    hw.press(&button);
    run(&mut ctl, &mut hw, &mut sink, 40);
    assert_eq!(ctl.state(), BoardState::Active);
    assert_eq!(sink.presses(), 0);

    run(&mut ctl, &mut hw, &mut sink, 10);
    assert_eq!(ctl.state(), BoardState::Inactive);
}

#[test]
fn bounce_released_before_window_is_ignored() {
    let button = button();
    let mut hw = MockBoard::new();
    let mut sink = RecordingSink::new();
    let mut ctl = started(&button, &mut hw, &mut sink);

    hw.press(&button);
    run(&mut ctl, &mut hw, &mut sink, 20);
    hw.release();
    run(&mut ctl, &mut hw, &mut sink, 200);

    assert_eq!(ctl.state(), BoardState::Active);
    assert_eq!(sink.presses(), 0);
    assert!(button.is_armed(), "edge stays pending until the level settles");
}

#[test]
fn cooldown_swallows_second_press() {
    let button = button();
    let mut hw = MockBoard::new();
    let mut sink = RecordingSink::new();
    let mut ctl = started(&button, &mut hw, &mut sink);

    hw.press(&button);
    run(&mut ctl, &mut hw, &mut sink, 60);
    hw.release();
    run(&mut ctl, &mut hw, &mut sink, 40);

    // 50 ms after the accepted press: still cooling down.
    hw.press(&button);
    run(&mut ctl, &mut hw, &mut sink, 100);
    assert_eq!(ctl.state(), BoardState::Inactive);
    assert_eq!(sink.presses(), 1);

    hw.release();
    run(&mut ctl, &mut hw, &mut sink, 400);
    hw.press(&button);
    run(&mut ctl, &mut hw, &mut sink, 60);
    assert_eq!(ctl.state(), BoardState::Active);
    assert_eq!(sink.presses(), 2);
}

#[test]
fn pattern_change_shows_in_the_same_tick() {
    let button = button();
    let mut hw = MockBoard::new();
    let mut sink = RecordingSink::new();
    let mut ctl = started(&button, &mut hw, &mut sink);

    hw.press(&button);
    run(&mut ctl, &mut hw, &mut sink, 60);
    hw.release();
    run(&mut ctl, &mut hw, &mut sink, 600);
    assert_eq!(ctl.state(), BoardState::Inactive);
    assert_eq!(hw.led(), Some(false));

    hw.press(&button);
    let mut turned_on = false;
    for _ in 0..10 {
        hw.calls.clear();
        run(&mut ctl, &mut hw, &mut sink, TICK_MS);
        if ctl.state() == BoardState::Active {
            turned_on = true;
            break;
        }
    }
    assert!(turned_on);
    assert_eq!(
        hw.calls,
        vec![
            OutputCall::Latch(true),
            OutputCall::LoadPower(true),
            OutputCall::Indicator(true),
        ]
    );
}

// ── Presence ──────────────────────────────────────────────────

#[test]
fn losing_presence_releases_latch() {
    let button = button();
    let mut hw = MockBoard::new().with_presence(true);
    let mut sink = RecordingSink::new();
    let mut ctl = started(&button, &mut hw, &mut sink);

    hw.presence = false;
    run(&mut ctl, &mut hw, &mut sink, TICK_MS);

    assert_eq!(ctl.state(), BoardState::Inactive);
    assert_eq!(hw.latch(), Some(false));
    assert_eq!(hw.load_power(), Some(false));
    assert_eq!(
        sink.transitions(),
        vec![(BoardState::InactiveWithPresence, BoardState::Inactive)]
    );
}

#[test]
fn presence_while_off_holds_latch_and_pulses() {
    let button = button();
    let mut hw = MockBoard::new();
    let mut sink = RecordingSink::new();
    let mut ctl = started(&button, &mut hw, &mut sink);

    hw.press(&button);
    run(&mut ctl, &mut hw, &mut sink, 60);
    hw.release();
    assert_eq!(ctl.state(), BoardState::Inactive);

    hw.presence = true;
    run(&mut ctl, &mut hw, &mut sink, TICK_MS);
    assert_eq!(ctl.state(), BoardState::InactiveWithPresence);
    assert_eq!(hw.latch(), Some(true));
    assert_eq!(
        ctl.indicator().pattern(),
        LedPattern::PulseSlow { period_ms: 2000 }
    );
}

#[test]
fn charging_indicator_pulses_while_active() {
    let button = button();
    let mut hw = MockBoard::new();
    let mut sink = RecordingSink::new();
    let mut ctl = started(&button, &mut hw, &mut sink);

    hw.presence = true;
    hw.calls.clear();
    run(&mut ctl, &mut hw, &mut sink, 4_000);

    assert_eq!(ctl.state(), BoardState::Active);
    assert!(hw.power_calls().is_empty());
    // One toggle per half period.
    let toggles = hw.led_writes();
    assert!((3..=4).contains(&toggles), "got {toggles} toggles");
}

#[test]
fn steady_inputs_cause_no_power_writes() {
    let button = button();
    let mut hw = MockBoard::new();
    let mut sink = RecordingSink::new();
    let mut ctl = started(&button, &mut hw, &mut sink);

    run(&mut ctl, &mut hw, &mut sink, 1_000);
    assert_eq!(hw.power_calls().len(), 2);
    assert!(sink.transitions().is_empty());
    assert_eq!(ctl.tick_count(), 100);
}

// ── Status ────────────────────────────────────────────────────

#[test]
fn status_keeps_bounded_history() {
    let button = button();
    let mut hw = MockBoard::new();
    let mut sink = RecordingSink::new();
    let mut ctl = started(&button, &mut hw, &mut sink);

    for _ in 0..10 {
        hw.press(&button);
        run(&mut ctl, &mut hw, &mut sink, 60);
        hw.release();
        run(&mut ctl, &mut hw, &mut sink, 500);
    }

    let status = ctl.status();
    assert_eq!(sink.transitions().len(), 10);
    assert_eq!(status.history.len(), HISTORY_LEN);
    let last = status.history.last().copied();
    assert_eq!(
        last.map(|r| (r.from, r.to)),
        sink.transitions().last().copied()
    );
    // Ten toggles from Active ends back in Active.
    assert_eq!(status.state, BoardState::Active);
    assert!(status.latch && status.load_power);
}

#[test]
fn status_serialises_to_json() {
    let button = button();
    let mut hw = MockBoard::new();
    let mut sink = RecordingSink::new();
    let mut ctl = started(&button, &mut hw, &mut sink);
    hw.voltage = 3.9;
    run(&mut ctl, &mut hw, &mut sink, 30);

    let json = serde_json::to_string(&ctl.status()).unwrap();
    assert!(json.contains("\"state\":\"Active\""), "{json}");
    assert!(json.contains("\"indicator\":\"FadeIn\""), "{json}");
    assert!(json.contains("\"ticks\":3"), "{json}");
    assert!(json.contains("\"history\":[]"), "{json}");
}
