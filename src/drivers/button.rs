//! ISR-armed button debouncer with a post-press cooldown.
//!
//! ## Hardware
//!
//! Single momentary switch.  The GPIO fires on the edge; the ISR calls
//! [`button_isr_handler`], which only arms the debouncer with a target
//! time.  The main loop calls [`Debouncer::poll`] once per control tick
//! with the raw pin level, and the press is confirmed only if the level
//! has settled low when the window expires.
//!
//! ## Cross-context state
//!
//! | Field              | Written by          | Read by     |
//! |--------------------|---------------------|-------------|
//! | `armed`            | ISR (set), loop (clear) | both    |
//! | `target_ms`        | ISR                 | loop        |
//! | `cooldown_until_ms`| loop                | ISR         |
//! | `cooling`          | loop (set), both (clear) | both   |
//!
//! All word-sized and atomic; no locks.  `target_ms` is stored before
//! `armed` is published with `Release`, so the loop never sees a stale
//! target for a fresh arm.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use log::info;

use crate::config::{DEBOUNCE_WINDOW_MS, PRESS_COOLDOWN_MS};
use crate::timing::Timestamp;

/// A validated button press.  Produced at most once per debounce cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PressEvent {
    /// Tick at which the press was confirmed.
    pub at: Timestamp,
}

pub struct Debouncer {
    window_ms: u32,
    cooldown_ms: u32,
    armed: AtomicBool,
    target_ms: AtomicU32,
    cooldown_until_ms: AtomicU32,
    cooling: AtomicBool,
}

/// The board's one button.  The edge ISR and the control loop share it.
pub static BUTTON: Debouncer = Debouncer::new(DEBOUNCE_WINDOW_MS, PRESS_COOLDOWN_MS);

impl Debouncer {
    pub const fn new(window_ms: u32, cooldown_ms: u32) -> Self {
        Self {
            window_ms,
            cooldown_ms,
            armed: AtomicBool::new(false),
            target_ms: AtomicU32::new(0),
            cooldown_until_ms: AtomicU32::new(0),
            cooling: AtomicBool::new(false),
        }
    }

    /// Raw edge notification.  Safe to call from interrupt context:
    /// no blocking, a handful of atomic loads and stores.
    ///
    /// No-op while already armed or while the cooldown is running.
    pub fn trigger(&self, now: Timestamp) {
        if self.armed.load(Ordering::Acquire) {
            return;
        }
        if self.cooling.load(Ordering::Acquire) {
            let until = Timestamp::from_millis(self.cooldown_until_ms.load(Ordering::Acquire));
            if !now.has_reached(until) {
                return;
            }
            self.cooling.store(false, Ordering::Release);
        }
        self.target_ms
            .store(now.offset(self.window_ms).as_millis(), Ordering::Relaxed);
        self.armed.store(true, Ordering::Release);
    }

    /// Call from the main loop at each control tick.
    /// `raw_level_high` is the current, possibly bouncing, pin level.
    pub fn poll(&self, now: Timestamp, raw_level_high: bool) -> Option<PressEvent> {
        if self.cooling.load(Ordering::Acquire) && !self.in_cooldown(now) {
            self.cooling.store(false, Ordering::Release);
        }

        if !self.armed.load(Ordering::Acquire) {
            return None;
        }
        let target = Timestamp::from_millis(self.target_ms.load(Ordering::Relaxed));
        if !now.has_reached(target) || raw_level_high {
            return None;
        }

        self.cooldown_until_ms
            .store(now.offset(self.cooldown_ms).as_millis(), Ordering::Relaxed);
        self.cooling.store(true, Ordering::Release);
        self.armed.store(false, Ordering::Release);
        info!("Button: press accepted at {now}");
        Some(PressEvent { at: now })
    }

    /// An edge has been seen and is waiting for the window to expire.
    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::Acquire)
    }

    /// New edges are still being ignored at `now`.
    pub fn in_cooldown(&self, now: Timestamp) -> bool {
        self.cooling.load(Ordering::Acquire)
            && !now.has_reached(Timestamp::from_millis(
                self.cooldown_until_ms.load(Ordering::Acquire),
            ))
    }
}

/// ISR handler: register this on the button GPIO edge.
/// Safe to call from interrupt context (lock-free atomics only).
pub fn button_isr_handler(now_ms: u32) {
    BUTTON.trigger(Timestamp::from_millis(now_ms));
}
