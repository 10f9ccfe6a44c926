//! Millisecond tick counter.

use core::sync::atomic::{AtomicU32, Ordering};

/// Monotonic millisecond counter advanced by the tick interrupt.
///
/// The counter is a single 32-bit word that wraps after about 49.7 days. All
/// duration math must use `now.wrapping_sub(start)`; comparing two readings
/// directly breaks across the wrap.
///
/// There is exactly one writer (the tick ISR calling [`Clock::tick`]), so the
/// increment is a plain load/store and needs no read-modify-write support from
/// the core.
#[derive(Debug)]
pub struct Clock {
    ms: AtomicU32,
}

impl Clock {
    /// A clock reading zero.
    pub const fn new() -> Self {
        Self::starting_at(0)
    }

    /// A clock starting at `ms`. Mostly useful for exercising wraparound.
    pub const fn starting_at(ms: u32) -> Self {
        Self {
            ms: AtomicU32::new(ms),
        }
    }

    /// Advance by one millisecond. Call from the periodic tick interrupt only.
    pub fn tick(&self) {
        let ms = self.ms.load(Ordering::Relaxed);
        self.ms.store(ms.wrapping_add(1), Ordering::Release);
    }

    /// Current millisecond count.
    pub fn now_ms(&self) -> u32 {
        self.ms.load(Ordering::Acquire)
    }

    /// Milliseconds since `start`, tolerant of wraparound.
    pub fn elapsed_since(&self, start: u32) -> u32 {
        self.now_ms().wrapping_sub(start)
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}
