//! Time management
//!
//! Tick arithmetic and the interrupt-driven tick counter. The tick counter
//! wraps at `u32::MAX`; all deadline comparisons use unsigned wrapping
//! subtraction so wraparound is transparent.

use portable_atomic::{AtomicU32, Ordering};

use crate::config::CFG_TICK_RATE_HZ;
use crate::hal::TickSource;
use crate::types::Tick;

/// Ticks elapsed since `since`, modulo the counter width
#[inline]
pub fn elapsed(now: Tick, since: Tick) -> Tick {
    now.wrapping_sub(since)
}

/// Check whether `deadline` has been reached at `now`.
///
/// Holds for deadlines up to half the counter range in the past.
#[inline]
pub fn reached(now: Tick, deadline: Tick) -> bool {
    now.wrapping_sub(deadline) < Tick::MAX / 2
}

/// Convert milliseconds to ticks at the configured tick rate
#[inline]
pub const fn ms_to_ticks(ms: u32) -> Tick {
    (ms as u64 * CFG_TICK_RATE_HZ as u64 / 1000) as Tick
}

/// Monotonic tick counter incremented from the tick interrupt.
///
/// The single global instance is owned by the application and shared with
/// the scheduler through the [`TickSource`] contract.
pub struct TickCounter {
    ticks: AtomicU32,
}

impl TickCounter {
    /// Create a counter starting at zero
    pub const fn new() -> Self {
        Self {
            ticks: AtomicU32::new(0),
        }
    }

    /// Advance by one tick; called from the SysTick handler
    #[inline(always)]
    pub fn increment(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    /// Current tick count
    #[inline(always)]
    pub fn now(&self) -> Tick {
        self.ticks.load(Ordering::Relaxed)
    }
}

impl Default for TickCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl TickSource for TickCounter {
    #[inline(always)]
    fn now(&self) -> Tick {
        TickCounter::now(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reached_simple() {
        assert!(reached(100, 100));
        assert!(reached(101, 100));
        assert!(!reached(99, 100));
    }

    #[test]
    fn reached_across_wraparound() {
        let deadline = u32::MAX.wrapping_add(10); // 9, after wrap
        assert!(!reached(u32::MAX, deadline));
        assert!(reached(9, deadline));
        assert!(reached(10, deadline));
    }

    #[test]
    fn elapsed_across_wraparound() {
        assert_eq!(elapsed(5, u32::MAX - 4), 10);
    }

    #[test]
    fn ms_conversion() {
        assert_eq!(ms_to_ticks(0), 0);
        assert_eq!(ms_to_ticks(1000), CFG_TICK_RATE_HZ);
    }

    #[test]
    fn counter_increments() {
        let counter = TickCounter::new();
        assert_eq!(counter.now(), 0);
        counter.increment();
        counter.increment();
        assert_eq!(counter.now(), 2);
    }
}
