//! Wraparound-safe monotonic timestamps.
//!
//! The platform tick counter is a `u32` of milliseconds since boot and
//! wraps roughly every 49.7 days.  Naive `>` comparisons break across
//! the wrap, so every deadline check in the crate goes through the
//! signed-difference helpers below.  They are exact as long as the two
//! instants being compared are less than 2^31 ms (~24.8 days) apart,
//! which holds for every debounce, cooldown and pulse window here.

use serde::Serialize;

/// Milliseconds since boot, wrapping at `u32::MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Timestamp(u32);

impl Timestamp {
    pub const ZERO: Self = Self(0);

    /// Longest span the signed-difference comparisons order correctly.
    pub const MAX_SPAN_MS: u32 = i32::MAX as u32;

    pub const fn from_millis(ms: u32) -> Self {
        Self(ms)
    }

    pub const fn as_millis(self) -> u32 {
        self.0
    }

    /// `self + ms`, wrapping.
    #[must_use]
    pub const fn offset(self, ms: u32) -> Self {
        Self(self.0.wrapping_add(ms))
    }

    /// Signed distance from `earlier` to `self`.
    pub const fn since(self, earlier: Self) -> i32 {
        self.0.wrapping_sub(earlier.0) as i32
    }

    /// Strictly later than `other`.
    pub const fn is_after(self, other: Self) -> bool {
        self.since(other) > 0
    }

    /// Equal to or later than `other`.
    pub const fn has_reached(self, other: Self) -> bool {
        self.since(other) >= 0
    }
}

impl core::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}ms", self.0)
    }
}
