//! Timer service tests.
//!
//! Tests expiry timing, drift-free restart, servicing order, callbacks that
//! touch the pool, and pool exhaustion.

#[allow(clippy::duplicate_mod)]
#[path = "helpers.rs"]
mod helpers;

use helpers::advance;
use helpers::fixtures::{RearmCallback, RecordingCallback, ReleaseSelfCallback};
use superloop::{
    CallbackAction, Clock, Error, TimerCallback, TimerId, TimerSlots, TimerState, Timers,
};

// ============================================================================
// Expiry
// ============================================================================

#[test]
fn test_polled_timer_expires_at_period() {
    let clock = Clock::new();
    let slots = TimerSlots::<5>::new();
    let timers = Timers::new(&clock, &slots);

    let id = timers.acquire(25, None, 0).unwrap();
    for _ in 1..25 {
        advance(&clock, 1);
        timers.tick_service();
        assert_eq!(timers.is_expired(id), Ok(false));
    }
    advance(&clock, 1);
    timers.tick_service();
    assert_eq!(timers.is_expired(id), Ok(true));

    // Stays expired until re-armed.
    advance(&clock, 100);
    timers.tick_service();
    assert_eq!(timers.state(id), Ok(TimerState::Expired));
}

#[test]
fn test_expiry_across_clock_wrap() {
    let clock = Clock::starting_at(u32::MAX - 10);
    let slots = TimerSlots::<2>::new();
    let timers = Timers::new(&clock, &slots);

    let id = timers.acquire(20, None, 0).unwrap();
    advance(&clock, 19);
    timers.tick_service();
    assert_eq!(timers.is_expired(id), Ok(false));

    advance(&clock, 1);
    timers.tick_service();
    assert_eq!(timers.is_expired(id), Ok(true));
}

#[test]
fn test_arm_restarts_from_now() {
    let clock = Clock::new();
    let slots = TimerSlots::<2>::new();
    let timers = Timers::new(&clock, &slots);

    let id = timers.acquire(10, None, 0).unwrap();
    advance(&clock, 8);
    timers.arm(id, 10).unwrap();

    advance(&clock, 2);
    timers.tick_service();
    assert_eq!(timers.is_expired(id), Ok(false));

    advance(&clock, 8);
    timers.tick_service();
    assert_eq!(timers.is_expired(id), Ok(true));

    timers.arm(id, 0).unwrap();
    assert_eq!(timers.state(id), Ok(TimerState::Stopped));
}

// ============================================================================
// Restart
// ============================================================================

#[test]
fn test_restart_is_drift_free_under_slow_callbacks() {
    let clock = Clock::new();
    let slow = RecordingCallback::new(&clock, 3, CallbackAction::Restart);
    let periodic = RecordingCallback::restart(&clock);
    let slots = TimerSlots::<5>::new();
    let timers = Timers::new(&clock, &slots);

    let _slow_id = timers.acquire(10, Some(&slow), 0).unwrap();
    let id = timers.acquire(10, Some(&periodic), 42).unwrap();

    for k in 1..=6u32 {
        let target = 10 * k;
        advance(&clock, target - clock.now_ms());
        timers.tick_service();

        let info = timers.info(id).unwrap();
        assert_eq!(info.state, TimerState::Running);
        assert_eq!(info.start_ms, target, "pass {}", k);
    }
    assert_eq!(periodic.count(), 6);
    assert!(periodic.calls().iter().all(|&(idx, data, _)| idx == 1 && data == 42));
}

#[test]
fn test_late_service_keeps_phase() {
    let clock = Clock::new();
    let periodic = RecordingCallback::restart(&clock);
    let slots = TimerSlots::<1>::new();
    let timers = Timers::new(&clock, &slots);

    let id = timers.acquire(10, Some(&periodic), 0).unwrap();
    advance(&clock, 14);
    timers.tick_service();
    assert_eq!(timers.info(id).unwrap().start_ms, 10);

    // Next expiry is at 20, not 24.
    advance(&clock, 6);
    timers.tick_service();
    assert_eq!(periodic.count(), 2);
    assert_eq!(timers.info(id).unwrap().start_ms, 20);
}

#[test]
fn test_stop_leaves_expired() {
    let clock = Clock::new();
    let oneshot = RecordingCallback::stop(&clock);
    let slots = TimerSlots::<1>::new();
    let timers = Timers::new(&clock, &slots);

    let id = timers.acquire(5, Some(&oneshot), 7).unwrap();
    advance(&clock, 50);
    timers.tick_service();
    timers.tick_service();

    assert_eq!(oneshot.calls(), vec![(0, 7, 50)]);
    assert_eq!(timers.is_expired(id), Ok(true));
}

#[test]
fn test_service_without_tick_does_nothing() {
    let clock = Clock::new();
    let periodic = RecordingCallback::restart(&clock);
    let slots = TimerSlots::<1>::new();
    let timers = Timers::new(&clock, &slots);

    timers.acquire(1, Some(&periodic), 0).unwrap();
    advance(&clock, 1);
    timers.tick_service();
    timers.tick_service();
    timers.tick_service();
    assert_eq!(periodic.count(), 1);
}

// ============================================================================
// Servicing order
// ============================================================================

#[test]
fn test_later_slots_see_fresh_clock() {
    let clock = Clock::new();
    let slow = RecordingCallback::new(&clock, 5, CallbackAction::Stop);
    let late = RecordingCallback::stop(&clock);
    let slots = TimerSlots::<3>::new();
    let timers = Timers::new(&clock, &slots);

    timers.acquire(10, Some(&slow), 0).unwrap();
    let id = timers.acquire(14, Some(&late), 0).unwrap();

    advance(&clock, 10);
    timers.tick_service();

    // Slot 0's callback ran until ms 15, so slot 1 is already due.
    assert_eq!(late.calls(), vec![(1, 0, 15)]);
    assert_eq!(timers.is_expired(id), Ok(true));
}

#[test]
fn test_callback_rearms_later_slot() {
    let clock = Clock::new();
    let rearm = RearmCallback {
        target: TimerId::new(1),
        period_ms: 5,
    };
    let slots = TimerSlots::<3>::new();
    let timers = Timers::new(&clock, &slots);

    timers.acquire(10, Some(&rearm), 0).unwrap();
    let target = timers.acquire(0, None, 0).unwrap();
    assert_eq!(target, TimerId::new(1));

    advance(&clock, 10);
    timers.tick_service();
    assert_eq!(timers.state(target), Ok(TimerState::Running));
    assert_eq!(timers.info(target).unwrap().start_ms, 10);

    advance(&clock, 5);
    timers.tick_service();
    assert_eq!(timers.is_expired(target), Ok(true));
}

#[test]
fn test_release_inside_callback_wins() {
    let clock = Clock::new();
    let release = ReleaseSelfCallback;
    let slots = TimerSlots::<2>::new();
    let timers = Timers::new(&clock, &slots);

    let id = timers.acquire(3, Some(&release), 0).unwrap();
    advance(&clock, 3);
    timers.tick_service();
    assert_eq!(timers.state(id), Ok(TimerState::Unused));
}

// ============================================================================
// Pool management
// ============================================================================

#[test]
fn test_pool_exhaustion_leaves_pool_unchanged() {
    let clock = Clock::new();
    let cb = RecordingCallback::stop(&clock);
    let slots = TimerSlots::<5>::new();
    let timers = Timers::new(&clock, &slots);

    let mut ids = Vec::new();
    for n in 0..5u32 {
        let callback: Option<&dyn TimerCallback> = if n % 2 == 0 { Some(&cb) } else { None };
        ids.push(timers.acquire(n * 3, callback, n).unwrap());
    }
    advance(&clock, 4);
    timers.tick_service();

    let before: Vec<_> = ids.iter().map(|&id| timers.info(id).unwrap()).collect();
    assert_eq!(timers.acquire(1, None, 99), Err(Error::Resource));
    let after: Vec<_> = ids.iter().map(|&id| timers.info(id).unwrap()).collect();
    assert_eq!(before, after);
}

#[test]
fn test_released_slot_is_reused_first() {
    let clock = Clock::new();
    let slots = TimerSlots::<3>::new();
    let timers = Timers::new(&clock, &slots);

    let a = timers.acquire(1, None, 0).unwrap();
    let b = timers.acquire(1, None, 0).unwrap();
    let _c = timers.acquire(1, None, 0).unwrap();
    timers.release(a).unwrap();
    timers.release(b).unwrap();

    assert_eq!(timers.acquire(0, None, 0), Ok(TimerId::new(0)));
    assert_eq!(timers.acquire(0, None, 0), Ok(TimerId::new(1)));
}

#[test]
fn test_bad_ids() {
    let clock = Clock::new();
    let slots = TimerSlots::<2>::new();
    let timers = Timers::new(&clock, &slots);
    let bogus = TimerId::new(2);

    assert_eq!(timers.arm(bogus, 1), Err(Error::Arg));
    assert_eq!(timers.release(bogus), Err(Error::Arg));
    assert_eq!(timers.is_expired(bogus), Err(Error::Arg));
    assert_eq!(timers.state(bogus), Err(Error::Arg));
    assert_eq!(timers.arm(TimerId::new(0), 1), Err(Error::State));
}
