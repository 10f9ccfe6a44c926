//! Test fixtures and utilities for superloop testing.
//!
//! Provides:
//! - `MockUart`: register-level UART stand-in with captured output
//! - Timer callbacks that record, stall, re-arm or release
//! - `DemoHandler` / `DEMO_COMMANDS`: a small command client

#![allow(dead_code)]

use core::fmt;
use std::cell::{Cell, RefCell};

use superloop::cmd::{parse_args, CommandHandler, CommandMeta};
use superloop::{CallbackAction, Clock, Error, TimerCallback, TimerId, Timers, Uart, UartStatus};

// ============================================================================
// MockUart - Test UART Implementation
// ============================================================================

/// Mock UART for testing.
///
/// Registers are cells so the port's main-loop and interrupt halves can both
/// hold `&MockUart`. Everything written to the data register is captured.
#[derive(Debug, Default)]
pub struct MockUart {
    status: Cell<u8>,
    rx_data: Cell<u8>,
    tx_log: RefCell<Vec<u8>>,
    data_reads: Cell<u32>,
    rx_ie: Cell<bool>,
    tx_ie: Cell<bool>,
}

impl MockUart {
    /// Create a UART with no flags set and interrupts off.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the status flags the next interrupt will see.
    pub fn set_status(&self, status: UartStatus) {
        self.status.set(status.bits());
    }

    /// Latch a received byte and raise RX_READY (plus any `extra` flags).
    pub fn latch_rx(&self, byte: u8, extra: UartStatus) {
        self.rx_data.set(byte);
        self.set_status(UartStatus::RX_READY | extra);
    }

    /// Bytes written to the data register so far.
    pub fn sent(&self) -> Vec<u8> {
        self.tx_log.borrow().clone()
    }

    /// Sent bytes as text.
    pub fn sent_str(&self) -> String {
        String::from_utf8_lossy(&self.tx_log.borrow()).into_owned()
    }

    /// Forget captured output.
    pub fn clear_sent(&self) {
        self.tx_log.borrow_mut().clear();
    }

    /// Number of data register reads.
    pub fn data_reads(&self) -> u32 {
        self.data_reads.get()
    }

    /// Receive interrupt enable.
    pub fn rx_enabled(&self) -> bool {
        self.rx_ie.get()
    }

    /// Transmit interrupt enable.
    pub fn tx_enabled(&self) -> bool {
        self.tx_ie.get()
    }
}

impl Uart for MockUart {
    fn status(&self) -> UartStatus {
        UartStatus::from_bits(self.status.get())
    }

    fn read_data(&self) -> u8 {
        self.data_reads.set(self.data_reads.get() + 1);
        self.status.set(
            self.status.get() & !(UartStatus::RX_READY | UartStatus::ERRORS).bits(),
        );
        self.rx_data.get()
    }

    fn write_data(&self, byte: u8) {
        self.tx_log.borrow_mut().push(byte);
    }

    fn set_rx_interrupt(&self, enabled: bool) {
        self.rx_ie.set(enabled);
    }

    fn set_tx_interrupt(&self, enabled: bool) {
        self.tx_ie.set(enabled);
    }

    fn tx_interrupt_enabled(&self) -> bool {
        self.tx_ie.get()
    }
}

// ============================================================================
// Timer callbacks
// ============================================================================

/// Records every expiry and asks for a restart.
///
/// With `cost_ms > 0` the callback advances the clock, standing in for a
/// callback that takes that long to run.
#[derive(Debug)]
pub struct RecordingCallback<'c> {
    clock: &'c Clock,
    cost_ms: u32,
    action: CallbackAction,
    calls: RefCell<Vec<(usize, u32, u32)>>,
}

impl<'c> RecordingCallback<'c> {
    /// Restarting callback with no cost.
    pub fn restart(clock: &'c Clock) -> Self {
        Self::new(clock, 0, CallbackAction::Restart)
    }

    /// One-shot callback with no cost.
    pub fn stop(clock: &'c Clock) -> Self {
        Self::new(clock, 0, CallbackAction::Stop)
    }

    /// Callback returning `action` after consuming `cost_ms`.
    pub fn new(clock: &'c Clock, cost_ms: u32, action: CallbackAction) -> Self {
        Self {
            clock,
            cost_ms,
            action,
            calls: RefCell::new(Vec::new()),
        }
    }

    /// `(timer index, user data, clock at call)` for every call.
    pub fn calls(&self) -> Vec<(usize, u32, u32)> {
        self.calls.borrow().clone()
    }

    /// Number of calls.
    pub fn count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl TimerCallback for RecordingCallback<'_> {
    fn expired(&self, _timers: &Timers<'_>, id: TimerId, user_data: u32) -> CallbackAction {
        self.calls
            .borrow_mut()
            .push((id.index(), user_data, self.clock.now_ms()));
        for _ in 0..self.cost_ms {
            self.clock.tick();
        }
        self.action
    }
}

/// Re-arms another timer from inside a callback.
#[derive(Debug)]
pub struct RearmCallback {
    pub target: TimerId,
    pub period_ms: u32,
}

impl TimerCallback for RearmCallback {
    fn expired(&self, timers: &Timers<'_>, _id: TimerId, _user_data: u32) -> CallbackAction {
        timers.arm(self.target, self.period_ms).ok();
        CallbackAction::Stop
    }
}

/// Releases its own timer, then asks for a restart anyway.
#[derive(Debug)]
pub struct ReleaseSelfCallback;

impl TimerCallback for ReleaseSelfCallback {
    fn expired(&self, timers: &Timers<'_>, id: TimerId, _user_data: u32) -> CallbackAction {
        timers.release(id).ok();
        CallbackAction::Restart
    }
}

// ============================================================================
// Demo command client
// ============================================================================

/// Sub-commands of the demo client.
pub const DEMO_COMMANDS: &[CommandMeta] = &[
    CommandMeta::new("status", "Get module status, usage: demo status"),
    CommandMeta::new("add", "Add two integers, usage: demo add <a> <b>"),
];

/// Handler for the demo client.
#[derive(Debug)]
pub struct DemoHandler;

impl CommandHandler for DemoHandler {
    fn execute(&self, cmd: &str, out: &mut dyn fmt::Write, args: &[&str]) -> Result<(), Error> {
        match cmd {
            "status" => {
                writeln!(out, "demo ok").ok();
                Ok(())
            }
            "add" => {
                let values = parse_args(&args[2..], "ii", out)?;
                let a = values[0].as_i32().unwrap_or(0);
                let b = values[1].as_i32().unwrap_or(0);
                writeln!(out, "{}", a.wrapping_add(b)).ok();
                Ok(())
            }
            _ => Err(Error::BadCommand),
        }
    }
}
