//! Duration statistics, e.g. for measuring main-loop iteration time.

use crate::tmr::Clock;

/// Min/max/average of repeated millisecond durations.
///
/// ```rust,ignore
/// let mut loop_stat = DurationStat::new();
/// loop {
///     loop_stat.restart(&clock);
///     // ... one super-loop iteration ...
/// }
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DurationStat {
    start_ms: u32,
    started: bool,
    accum_ms: u64,
    samples: u32,
    min: u32,
    max: u32,
}

impl Default for DurationStat {
    fn default() -> Self {
        Self::new()
    }
}

impl DurationStat {
    /// No samples.
    pub const fn new() -> Self {
        Self {
            start_ms: 0,
            started: false,
            accum_ms: 0,
            samples: 0,
            min: u32::MAX,
            max: 0,
        }
    }

    /// Begin a measurement.
    pub fn start(&mut self, clock: &Clock) {
        self.start_ms = clock.now_ms();
        self.started = true;
    }

    /// End the current measurement and record it. No-op if not started.
    pub fn end(&mut self, clock: &Clock) {
        if !self.started || self.samples == u32::MAX {
            return;
        }
        self.started = false;
        self.record(clock.elapsed_since(self.start_ms));
    }

    /// End the current measurement (if any) and start the next one at the
    /// same instant, so no time falls between samples.
    pub fn restart(&mut self, clock: &Clock) {
        if self.samples == u32::MAX {
            return;
        }
        let now = clock.now_ms();
        if self.started {
            self.record(now.wrapping_sub(self.start_ms));
        }
        self.started = true;
        self.start_ms = now;
    }

    fn record(&mut self, dur: u32) {
        self.accum_ms += u64::from(dur);
        self.samples += 1;
        self.max = self.max.max(dur);
        self.min = self.min.min(dur);
    }

    /// Average duration in microseconds (0 with no samples).
    pub fn avg_us(&self) -> u32 {
        if self.samples == 0 {
            return 0;
        }
        let avg = self.accum_ms * 1000 / u64::from(self.samples);
        u32::try_from(avg).unwrap_or(u32::MAX)
    }

    /// Shortest recorded duration in ms, if any.
    pub fn min_ms(&self) -> Option<u32> {
        (self.samples > 0).then_some(self.min)
    }

    /// Longest recorded duration in ms.
    pub fn max_ms(&self) -> u32 {
        self.max
    }

    /// Number of recorded durations.
    pub fn samples(&self) -> u32 {
        self.samples
    }
}
