//! Configuration traits and implementations for resource sizing.
//!
//! The `RuntimeConfig` trait allows compile-time configuration of pool sizes,
//! registry capacity and serial buffer sizes without runtime overhead. Sizes
//! reach the const-generic containers through concrete paths, e.g.
//! `Registry<'a, { DefaultConfig::MAX_CLIENTS }>`.

/// Runtime configuration trait defining pool sizes and capacity limits.
///
/// All values are const (zero runtime cost).
pub trait RuntimeConfig {
    /// Number of software timer slots (default: 5)
    const TIMER_SLOTS: usize;

    /// Maximum number of registered command clients (default: 10)
    const MAX_CLIENTS: usize;

    /// Serial receive ring size in slots; usable capacity is one less (default: 80)
    const RX_BUF_SIZE: usize;

    /// Serial transmit ring size in slots; usable capacity is one less (default: 1024)
    const TX_BUF_SIZE: usize;
}

/// Default configuration for typical microcontrollers.
///
/// - TIMER_SLOTS: 5
/// - MAX_CLIENTS: 10
/// - RX_BUF_SIZE: 80 bytes
/// - TX_BUF_SIZE: 1024 bytes
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DefaultConfig;

impl RuntimeConfig for DefaultConfig {
    const TIMER_SLOTS: usize = 5;
    const MAX_CLIENTS: usize = 10;
    const RX_BUF_SIZE: usize = 80;
    const TX_BUF_SIZE: usize = 1024;
}

/// Minimal configuration for RAM-constrained parts.
///
/// - TIMER_SLOTS: 3
/// - MAX_CLIENTS: 4
/// - RX_BUF_SIZE: 32 bytes
/// - TX_BUF_SIZE: 128 bytes
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MinimalConfig;

impl RuntimeConfig for MinimalConfig {
    const TIMER_SLOTS: usize = 3;
    const MAX_CLIENTS: usize = 4;
    const RX_BUF_SIZE: usize = 32;
    const TX_BUF_SIZE: usize = 128;
}

/// Maximum tokens accepted by the command tokenizer.
///
/// Not part of [`RuntimeConfig`]: the token vector is a concrete
/// `heapless::Vec`, so the limit is the same for every configuration.
pub const MAX_TOKENS: usize = 10;

/// Per-port policy flags.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PortConfig {
    /// Emit `\r` after every `\n` written through the port's text path.
    pub send_cr_after_nl: bool,
}

impl PortConfig {
    /// Default policy: terminal-friendly line endings.
    pub const fn new() -> Self {
        Self {
            send_cr_after_nl: true,
        }
    }

    /// Raw policy: bytes are written unchanged.
    pub const fn raw() -> Self {
        Self {
            send_cr_after_nl: false,
        }
    }
}

impl Default for PortConfig {
    fn default() -> Self {
        Self::new()
    }
}
