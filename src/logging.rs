//! Per-module log levels on top of the `log` facade.
//!
//! Every module that logs owns a [`LevelCell`] and passes it to the
//! `log_*!` macros. The command engine exposes the cell through the
//! `<client> log [level]` and `* log [level]` pseudo-commands, so levels can be
//! changed at run time without the module being involved.
//!
//! A global "log active" flag suppresses all output regardless of level; the
//! console toggles it from a hot key.
//!
//! ```rust,ignore
//! static LOG_LEVEL: LevelCell = LevelCell::new(LogLevel::Info);
//!
//! log_debug!(LOG_LEVEL, "acquired timer {}", id.index());
//! ```

use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

/// Log level, ordered from least to most verbose.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// No output
    Off = 0,
    /// Errors only
    Error = 1,
    /// Errors and warnings
    Warning = 2,
    /// Informational messages (default)
    Info = 3,
    /// Debug messages
    Debug = 4,
    /// Everything
    Trace = 5,
}

/// All levels in ascending order.
pub const LEVELS: [LogLevel; 6] = [
    LogLevel::Off,
    LogLevel::Error,
    LogLevel::Warning,
    LogLevel::Info,
    LogLevel::Debug,
    LogLevel::Trace,
];

/// Level names as shown in help output.
pub const LEVEL_NAMES: &str = "off, error, warning, info, debug, trace";

impl LogLevel {
    /// Level a module starts with.
    pub const DEFAULT: LogLevel = LogLevel::Info;

    /// Console name of this level.
    pub const fn as_str(self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warning => "warning",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }

    /// Parse a level name, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Self> {
        LEVELS
            .iter()
            .copied()
            .find(|level| level.as_str().eq_ignore_ascii_case(name))
    }

    const fn from_u8(raw: u8) -> Self {
        match raw {
            0 => LogLevel::Off,
            1 => LogLevel::Error,
            2 => LogLevel::Warning,
            3 => LogLevel::Info,
            4 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }

    /// Equivalent filter for the `log` facade.
    pub const fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warning => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

impl Default for LogLevel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A module's current log level.
///
/// Atomic so it can live in a `static` and be read from interrupt context.
#[derive(Debug)]
pub struct LevelCell(AtomicU8);

impl LevelCell {
    /// Create a cell holding `level`.
    pub const fn new(level: LogLevel) -> Self {
        Self(AtomicU8::new(level as u8))
    }

    /// Current level.
    pub fn get(&self) -> LogLevel {
        LogLevel::from_u8(self.0.load(Ordering::Relaxed))
    }

    /// Replace the level.
    pub fn set(&self, level: LogLevel) {
        self.0.store(level as u8, Ordering::Relaxed);
    }

    /// True if a message at `level` should be emitted.
    pub fn enabled(&self, level: LogLevel) -> bool {
        level != LogLevel::Off && level <= self.get() && is_active()
    }
}

impl Default for LevelCell {
    fn default() -> Self {
        Self::new(LogLevel::DEFAULT)
    }
}

static LOG_ACTIVE: AtomicBool = AtomicBool::new(true);

/// True unless logging has been switched off globally.
pub fn is_active() -> bool {
    LOG_ACTIVE.load(Ordering::Relaxed)
}

/// Switch all logging on or off.
pub fn set_active(active: bool) {
    LOG_ACTIVE.store(active, Ordering::Relaxed);
}

/// Flip the global flag, returning the new state.
pub fn toggle_active() -> bool {
    let active = !is_active();
    set_active(active);
    active
}

/// Log an error through `$level`.
#[macro_export]
macro_rules! log_error {
    ($level:expr, $($arg:tt)+) => {
        if $level.enabled($crate::logging::LogLevel::Error) {
            $crate::__log::error!($($arg)+);
        }
    };
}

/// Log a warning through `$level`.
#[macro_export]
macro_rules! log_warning {
    ($level:expr, $($arg:tt)+) => {
        if $level.enabled($crate::logging::LogLevel::Warning) {
            $crate::__log::warn!($($arg)+);
        }
    };
}

/// Log an informational message through `$level`.
#[macro_export]
macro_rules! log_info {
    ($level:expr, $($arg:tt)+) => {
        if $level.enabled($crate::logging::LogLevel::Info) {
            $crate::__log::info!($($arg)+);
        }
    };
}

/// Log a debug message through `$level`.
#[macro_export]
macro_rules! log_debug {
    ($level:expr, $($arg:tt)+) => {
        if $level.enabled($crate::logging::LogLevel::Debug) {
            $crate::__log::debug!($($arg)+);
        }
    };
}

/// Log a trace message through `$level`.
#[macro_export]
macro_rules! log_trace {
    ($level:expr, $($arg:tt)+) => {
        if $level.enabled($crate::logging::LogLevel::Trace) {
            $crate::__log::trace!($($arg)+);
        }
    };
}
