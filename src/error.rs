//! Error types for runtime operations.
//!
//! The `Error` enum is shared by the timer service, the serial transport and
//! the command engine. None of these conditions is fatal to the runtime.

use core::fmt;

/// Runtime error type.
///
/// `Arg` and `BadCommand` are always reported to the console that issued the
/// command. `Resource` and `State` go back to the calling module, which decides
/// whether to log and continue. `BufferOverrun` is informational: the byte was
/// dropped and counted.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Error {
    /// Malformed or out-of-range argument
    Arg,

    /// Pool or registry exhausted
    Resource,

    /// Operation not valid for the current lifecycle state
    State,

    /// Unparseable or unknown command line
    BadCommand,

    /// Ring buffer was full; data dropped
    BufferOverrun,

    /// No such hardware instance.
    ///
    /// Not returned by this crate, whose ports are owned values. Reserved for
    /// collaborators that address peripherals by index (e.g. pin or port
    /// numbers typed at the console) so they report with the shared codes.
    BadInstance,
}

impl Error {
    /// Legacy numeric code, as printed by diagnostic commands.
    pub const fn code(self) -> i32 {
        match self {
            Error::Arg => -1,
            Error::Resource => -2,
            Error::State => -3,
            Error::BadCommand => -4,
            Error::BufferOverrun => -5,
            Error::BadInstance => -6,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Arg => write!(f, "Invalid argument"),
            Error::Resource => write!(f, "Out of resources"),
            Error::State => write!(f, "Invalid state"),
            Error::BadCommand => write!(f, "Bad command"),
            Error::BufferOverrun => write!(f, "Buffer overrun"),
            Error::BadInstance => write!(f, "Bad instance"),
        }
    }
}
