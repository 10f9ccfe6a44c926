//! Software timer service.
//!
//! A fixed pool of logical timers multiplexed over one millisecond [`Clock`].
//! Modules never touch the hardware timer: they acquire a slot, optionally
//! with a [`TimerCallback`], and either poll [`Timers::is_expired`] or let
//! [`Timers::tick_service`] call them back from the main loop.
//!
//! Slot lifecycle:
//!
//! ```text
//! Unused -> Stopped <-> Running -> Expired
//!                       Running -> Running   (callback asked to restart)
//! any    -> Unused                           (release)
//! ```
//!
//! Callbacks run in main-loop context, never from the tick interrupt. A
//! restarted timer keeps its phase: the next period is measured from the
//! previous scheduled start, not from the moment the callback ran.
//!
//! The pool borrows its storage, so `Timers` itself is not generic over the
//! slot count:
//!
//! ```rust,ignore
//! let clock = Clock::new();
//! let slots = TimerSlots::<5>::new();
//! let timers = Timers::new(&clock, &slots);
//!
//! let id = timers.acquire(100, None, 0)?;
//! loop {
//!     timers.tick_service();
//!     if timers.is_expired(id)? { /* ... */ }
//! }
//! ```

use core::cell::Cell;
use core::fmt;

use crate::error::Error;
use crate::logging::LevelCell;
use crate::{log_debug, log_error};

mod clock;
#[cfg(feature = "commands")]
pub mod commands;

pub use clock::Clock;

/// Identifies a slot in the timer pool.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TimerId(usize);

impl TimerId {
    /// Wrap a raw slot index (e.g. one typed at the console). Range is checked
    /// by every `Timers` operation.
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Raw slot index.
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Lifecycle state of a timer slot.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TimerState {
    /// Free for `acquire`
    Unused,
    /// Acquired but not timing
    Stopped,
    /// Timing; expires once the period has elapsed
    Running,
    /// Period elapsed and no restart was requested
    Expired,
}

impl TimerState {
    /// Short lowercase name for status output.
    pub const fn as_str(self) -> &'static str {
        match self {
            TimerState::Unused => "unused",
            TimerState::Stopped => "stopped",
            TimerState::Running => "running",
            TimerState::Expired => "expired",
        }
    }
}

/// What an expiry callback wants done with its timer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    /// Run again, one period after the previous scheduled start
    Restart,
    /// Stay expired until re-armed or released
    Stop,
}

/// Expiry handler attached to a timer slot.
///
/// Called from [`Timers::tick_service`] with the pool itself, so a callback may
/// arm, release or acquire timers (including its own).
pub trait TimerCallback {
    /// The timer `id` expired.
    fn expired(&self, timers: &Timers<'_>, id: TimerId, user_data: u32) -> CallbackAction;
}

/// Snapshot of one slot, for diagnostics.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TimerInfo {
    /// Period in ms (0 for a stopped timer)
    pub period_ms: u32,
    /// Scheduled start of the current period
    pub start_ms: u32,
    /// Lifecycle state
    pub state: TimerState,
    /// True if a callback is attached
    pub has_callback: bool,
    /// Opaque word passed to the callback
    pub user_data: u32,
}

#[derive(Copy, Clone)]
struct Slot<'a> {
    period_ms: u32,
    start_ms: u32,
    state: TimerState,
    callback: Option<&'a dyn TimerCallback>,
    user_data: u32,
}

impl Slot<'_> {
    const fn unused() -> Self {
        Self {
            period_ms: 0,
            start_ms: 0,
            state: TimerState::Unused,
            callback: None,
            user_data: 0,
        }
    }

    fn info(&self) -> TimerInfo {
        TimerInfo {
            period_ms: self.period_ms,
            start_ms: self.start_ms,
            state: self.state,
            has_callback: self.callback.is_some(),
            user_data: self.user_data,
        }
    }

    /// Stop for a zero period, otherwise (re)start from `now`.
    fn schedule(&mut self, period_ms: u32, now: u32) {
        self.period_ms = period_ms;
        if period_ms == 0 {
            self.state = TimerState::Stopped;
        } else {
            self.start_ms = now;
            self.state = TimerState::Running;
        }
    }
}

/// Backing storage for `N` timer slots.
pub struct TimerSlots<'a, const N: usize> {
    slots: [Cell<Slot<'a>>; N],
}

impl<'a, const N: usize> TimerSlots<'a, N> {
    /// All slots unused.
    pub fn new() -> Self {
        Self {
            slots: core::array::from_fn(|_| Cell::new(Slot::unused())),
        }
    }
}

impl<const N: usize> Default for TimerSlots<'_, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> fmt::Debug for TimerSlots<'_, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerSlots").field("len", &N).finish()
    }
}

/// The timer pool.
///
/// Main-loop only: it is deliberately `!Sync`. The tick interrupt talks to the
/// [`Clock`], never to this type.
pub struct Timers<'a> {
    clock: &'a Clock,
    slots: &'a [Cell<Slot<'a>>],
    last_ms: Cell<u32>,
    log_level: LevelCell,
}

impl fmt::Debug for Timers<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        for cell in self.slots.iter() {
            list.entry(&cell.get().info());
        }
        list.finish()
    }
}

impl<'a> Timers<'a> {
    /// Create the pool over `slots`, reading time from `clock`.
    pub fn new<const N: usize>(clock: &'a Clock, slots: &'a TimerSlots<'a, N>) -> Self {
        for cell in slots.slots.iter() {
            cell.set(Slot::unused());
        }
        Self {
            clock,
            slots: &slots.slots,
            last_ms: Cell::new(clock.now_ms()),
            log_level: LevelCell::default(),
        }
    }

    /// Current millisecond count.
    pub fn now_ms(&self) -> u32 {
        self.clock.now_ms()
    }

    /// The clock this pool reads.
    pub fn clock(&self) -> &'a Clock {
        self.clock
    }

    /// Number of slots in the pool.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// This module's log level, for registration with the command engine.
    pub fn log_level(&self) -> &LevelCell {
        &self.log_level
    }

    fn slot(&self, id: TimerId) -> Result<&Cell<Slot<'a>>, Error> {
        self.slots.get(id.0).ok_or(Error::Arg)
    }

    /// Allocate a timer.
    ///
    /// A zero `period_ms` yields a stopped timer; otherwise it starts running
    /// now. Fails with [`Error::Resource`] when every slot is in use, leaving
    /// the pool untouched.
    pub fn acquire(
        &self,
        period_ms: u32,
        callback: Option<&'a dyn TimerCallback>,
        user_data: u32,
    ) -> Result<TimerId, Error> {
        let Some(idx) = self
            .slots
            .iter()
            .position(|cell| cell.get().state == TimerState::Unused)
        else {
            log_error!(self.log_level, "Out of timers");
            return Err(Error::Resource);
        };

        let mut slot = Slot::unused();
        slot.callback = callback;
        slot.user_data = user_data;
        slot.schedule(period_ms, self.now_ms());
        self.slots[idx].set(slot);

        log_debug!(self.log_level, "acquired timer {} period={}", idx, period_ms);
        Ok(TimerId(idx))
    }

    /// Re-arm an acquired timer, discarding its previous schedule.
    ///
    /// A zero `period_ms` stops it; otherwise it restarts from now.
    pub fn arm(&self, id: TimerId, period_ms: u32) -> Result<(), Error> {
        let cell = self.slot(id)?;
        let mut slot = cell.get();
        if slot.state == TimerState::Unused {
            return Err(Error::State);
        }
        slot.schedule(period_ms, self.now_ms());
        cell.set(slot);
        Ok(())
    }

    /// Return a slot to the pool, whatever its state.
    pub fn release(&self, id: TimerId) -> Result<(), Error> {
        let cell = self.slot(id)?;
        cell.set(Slot::unused());
        Ok(())
    }

    /// True once the timer has expired and was not restarted.
    pub fn is_expired(&self, id: TimerId) -> Result<bool, Error> {
        Ok(self.slot(id)?.get().state == TimerState::Expired)
    }

    /// Lifecycle state of a slot.
    pub fn state(&self, id: TimerId) -> Result<TimerState, Error> {
        Ok(self.slot(id)?.get().state)
    }

    /// Diagnostic snapshot of a slot.
    pub fn info(&self, id: TimerId) -> Result<TimerInfo, Error> {
        Ok(self.slot(id)?.get().info())
    }

    /// Expire due timers and run their callbacks. Call once per loop iteration.
    ///
    /// Slots are serviced in index order. The clock is re-read after every
    /// callback, so a timer armed by an earlier callback in the same pass is
    /// judged against the time at its own turn.
    pub fn tick_service(&self) {
        let mut now = self.clock.now_ms();
        if now == self.last_ms.get() {
            return;
        }
        self.last_ms.set(now);

        for (idx, cell) in self.slots.iter().enumerate() {
            let mut slot = cell.get();
            if slot.state != TimerState::Running || now.wrapping_sub(slot.start_ms) < slot.period_ms
            {
                continue;
            }

            slot.state = TimerState::Expired;
            cell.set(slot);

            let Some(callback) = slot.callback else {
                continue;
            };
            let action = callback.expired(self, TimerId(idx), slot.user_data);
            now = self.clock.now_ms();

            // The callback may have re-armed or released this slot; that wins.
            let mut after = cell.get();
            if action == CallbackAction::Restart && after.state == TimerState::Expired {
                after.state = TimerState::Running;
                after.start_ms = after.start_ms.wrapping_add(after.period_ms);
                cell.set(after);
            }
        }
    }
}
