//! Performance measurements: named, saturating 16-bit counters.
//!
//! A module declares its counters as a fieldless enum with
//! `#[derive(PmCounters)]`, allocates a [`Counters`] sized by the enum, and
//! hands the set to the command engine, which reads and clears it through the
//! `<client> pm [clear]` pseudo-command.
//!
//! ```rust,ignore
//! #[derive(Copy, Clone, PmCounters)]
//! enum MainPm {
//!     InitErr,
//!     StartErr,
//! }
//!
//! static PMS: Counters<{ MainPm::COUNT }> = Counters::new(MainPm::NAMES);
//!
//! PMS.inc(MainPm::StartErr);
//! ```

use core::fmt;
use core::sync::atomic::{AtomicU16, Ordering};

/// Identifies one counter in a set. Implemented by `#[derive(PmCounters)]`.
pub trait CounterId: Copy {
    /// Number of counters in the set.
    const COUNT: usize;

    /// Display names, indexed like the counters.
    const NAMES: &'static [&'static str];

    /// Slot index of this counter.
    fn index(self) -> usize;
}

/// Read/clear access to a counter set, as used by the `pm` pseudo-command.
pub trait PerfCounters {
    /// Number of counters.
    fn len(&self) -> usize;

    /// True if there are no counters.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write the display label of counter `idx`.
    fn label(&self, idx: usize, out: &mut dyn fmt::Write) -> fmt::Result;

    /// Current value of counter `idx` (0 if out of range).
    fn value(&self, idx: usize) -> u16;

    /// Zero every counter.
    fn clear(&self);
}

/// Increment `counter`, saturating at `u16::MAX`.
///
/// Only load and store are used, so this works on cores without atomic
/// read-modify-write. Each counter must have a single incrementing context.
pub fn inc_saturating(counter: &AtomicU16) {
    let value = counter.load(Ordering::Relaxed);
    if value != u16::MAX {
        counter.store(value + 1, Ordering::Relaxed);
    }
}

/// A fixed set of `N` named counters.
#[derive(Debug)]
pub struct Counters<const N: usize> {
    values: [AtomicU16; N],
    names: &'static [&'static str],
}

impl<const N: usize> Counters<N> {
    /// Create a zeroed set. `names` must hold exactly `N` entries.
    pub const fn new(names: &'static [&'static str]) -> Self {
        assert!(names.len() == N, "counter names must match counter count");
        Self {
            values: [const { AtomicU16::new(0) }; N],
            names,
        }
    }

    /// Saturating increment of counter `id`.
    pub fn inc<I: CounterId>(&self, id: I) {
        if let Some(counter) = self.values.get(id.index()) {
            inc_saturating(counter);
        }
    }

    /// Current value of counter `id`.
    pub fn get<I: CounterId>(&self, id: I) -> u16 {
        self.value(id.index())
    }

    /// Display name of counter `idx`.
    pub fn name(&self, idx: usize) -> Option<&'static str> {
        self.names.get(idx).copied()
    }
}

impl<const N: usize> PerfCounters for Counters<N> {
    fn len(&self) -> usize {
        N
    }

    fn label(&self, idx: usize, out: &mut dyn fmt::Write) -> fmt::Result {
        out.write_str(self.names.get(idx).copied().unwrap_or("?"))
    }

    fn value(&self, idx: usize) -> u16 {
        self.values
            .get(idx)
            .map(|v| v.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    fn clear(&self) {
        for v in self.values.iter() {
            v.store(0, Ordering::Relaxed);
        }
    }
}
