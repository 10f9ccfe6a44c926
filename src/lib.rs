//! # superloop
//!
//! Runtime substrate for cooperative super-loop firmware with zero heap
//! allocation.
//!
//! **Key features:**
//! - **Software timers** - Many one-shot/periodic timers over one millisecond tick
//! - **Serial transport** - Interrupt-driven UART with lock-free SPSC rings
//! - **Command engine** - Modules register console sub-commands by name
//! - **Diagnostics** - Per-module log levels and saturating `pm` counters
//!
//! Every resource is an explicitly owned value (one timer pool, one registry,
//! one `Port` per UART) constructed at startup and lent to the code that needs
//! it. Nothing blocks; the main loop polls:
//!
//! ```rust,ignore
//! loop {
//!     while let Some(b) = tty.get_byte() {
//!         if let Some(line) = console.feed(b) {
//!             registry.execute(line, &mut tty).ok();
//!         }
//!     }
//!     timers.tick_service();
//!     loop_stat.restart(timers.clock());
//! }
//! ```
//!
//! ## Optional Features
//!
//! - `commands` - `tmr` and `ttys` console clients (default)
//!
//! The library provides a `#[derive(PmCounters)]` macro that's always available.
//!
//! This library is `no_std` compatible.

#![no_std]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

extern crate heapless;

// Lets the derive macro's `::superloop::` paths resolve inside this crate.
extern crate self as superloop;

// Re-export derive macro (always available)
pub use superloop_macros::PmCounters;

#[doc(hidden)]
pub use log as __log;

// ============================================================================
// Module Declarations
// ============================================================================

// Foundation
pub mod config;
pub mod error;
pub mod io;
pub mod logging;
pub mod pm;

// Timer service
pub mod stat;
pub mod tmr;

// Serial transport
pub mod serial;

// Command engine
pub mod cmd;

// ============================================================================
// Re-exports - Public API
// ============================================================================

// Core I/O
pub use io::CharIo;

// Configuration
pub use config::{DefaultConfig, MinimalConfig, PortConfig, RuntimeConfig};

// Error types
pub use error::Error;

// Logging and counters
pub use logging::{LevelCell, LogLevel};
pub use pm::{CounterId, Counters, PerfCounters};

// Timer service
pub use stat::DurationStat;
pub use tmr::{CallbackAction, Clock, TimerCallback, TimerId, TimerInfo, TimerSlots, TimerState, Timers};

// Serial transport
pub use serial::{Port, PortHandle, PortIrq, PortMonitor, SerialPm, Uart, UartStatus};

// Command engine
pub use cmd::{ArgValue, Client, CommandHandler, CommandMeta, Registry, parse_args};

// ============================================================================
// Library Metadata
// ============================================================================

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
