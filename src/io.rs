//! Byte I/O abstraction for console-style consumers.
//!
//! The `CharIo` trait provides non-blocking byte-level input/output. The serial
//! transport's main-loop handle implements it; line disciplines and parsers
//! (console, GPS sentence assembly) are written against the trait.

/// Platform-agnostic byte I/O trait.
///
/// - `get_char()` never blocks; `Ok(None)` means nothing is buffered yet
/// - `put_char()` never blocks; implementations may drop output under overrun
pub trait CharIo {
    /// Platform-specific error type
    type Error;

    /// Non-blocking byte read.
    ///
    /// Returns:
    /// - `Ok(Some(byte))` if a byte is available
    /// - `Ok(None)` if no byte is available (non-blocking)
    /// - `Err(Self::Error)` on I/O error
    fn get_char(&mut self) -> Result<Option<u8>, Self::Error>;

    /// Queue one byte for output.
    fn put_char(&mut self, c: u8) -> Result<(), Self::Error>;

    /// Queue a string for output.
    ///
    /// Default implementation uses `put_char()` repeatedly and stops at the
    /// first error.
    fn write_str(&mut self, s: &str) -> Result<(), Self::Error> {
        for b in s.bytes() {
            self.put_char(b)?;
        }
        Ok(())
    }
}
