//! Interrupt-driven serial transport.
//!
//! A [`Port`] owns a UART, a receive ring and a transmit ring. It is split
//! once at startup into three views:
//!
//! - [`PortHandle`]: main-loop side; queues output, drains input
//! - [`PortIrq`]: interrupt side; moves bytes between the UART and the rings
//! - [`PortMonitor`]: read-only indices and counters for diagnostics
//!
//! Neither side ever blocks. A full transmit ring drops the byte and counts a
//! `tx buf overrun`; a full receive ring does the same for input. UART error
//! flags are cleared and counted from the interrupt handler.
//!
//! The only interrupt-masked section is in [`PortHandle::put_byte`], which must
//! re-enable the transmit interrupt after the ISR turned it off on an empty
//! ring.
//!
//! ```rust,ignore
//! let mut port: Port<Usart2, 80, 1024> = Port::new(usart2, PortConfig::new());
//! let (mut tty, irq, monitor) = port.split();
//! // move `irq` into the USART2 interrupt handler, then:
//! tty.start();
//! writeln!(tty, "hello").ok();
//! ```

use core::fmt;
use core::ops::{BitAnd, BitOr};
use core::sync::atomic::{AtomicBool, Ordering};

use crate::config::PortConfig;
use crate::error::Error;
use crate::io::CharIo;
use crate::pm::{CounterId, Counters};
use crate::PmCounters;

#[cfg(feature = "commands")]
pub mod commands;
mod ring;

pub use ring::{Consumer, Producer, RingBuffer, RingIndices};

// ============================================================================
// Hardware interface
// ============================================================================

/// UART status flags as seen by the interrupt handler.
#[derive(Copy, Clone, PartialEq, Eq, Default)]
pub struct UartStatus(u8);

impl UartStatus {
    /// Received byte waiting in the data register
    pub const RX_READY: Self = Self(1 << 0);
    /// Transmit data register empty
    pub const TX_READY: Self = Self(1 << 1);
    /// Receiver overrun
    pub const OVERRUN: Self = Self(1 << 2);
    /// Noise detected
    pub const NOISE: Self = Self(1 << 3);
    /// Framing error
    pub const FRAMING: Self = Self(1 << 4);
    /// Parity error
    pub const PARITY: Self = Self(1 << 5);
    /// All error flags
    pub const ERRORS: Self =
        Self(Self::OVERRUN.0 | Self::NOISE.0 | Self::FRAMING.0 | Self::PARITY.0);

    /// Flags from raw bits, as laid out by the constants above. Unknown bits
    /// are dropped.
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0x3f)
    }

    /// No flags set.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Raw flag bits.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// True if every flag in `other` is set.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// True if no flag is set.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for UartStatus {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitAnd for UartStatus {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl fmt::Debug for UartStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UartStatus({:#04x})", self.0)
    }
}

/// Register-level access to one UART.
///
/// All methods take `&self`: implementations wrap memory-mapped registers (or
/// cells, in tests) and are shared by the main loop and the interrupt handler.
pub trait Uart {
    /// Read the status flags.
    fn status(&self) -> UartStatus;

    /// Read the receive data register. Also clears pending error flags.
    fn read_data(&self) -> u8;

    /// Write the transmit data register.
    fn write_data(&self, byte: u8);

    /// Enable or disable the receive (and error) interrupt.
    fn set_rx_interrupt(&self, enabled: bool);

    /// Enable or disable the transmit-ready interrupt.
    fn set_tx_interrupt(&self, enabled: bool);

    /// True if the transmit-ready interrupt is enabled.
    fn tx_interrupt_enabled(&self) -> bool;
}

impl<T: Uart + ?Sized> Uart for &T {
    fn status(&self) -> UartStatus {
        (**self).status()
    }

    fn read_data(&self) -> u8 {
        (**self).read_data()
    }

    fn write_data(&self, byte: u8) {
        (**self).write_data(byte)
    }

    fn set_rx_interrupt(&self, enabled: bool) {
        (**self).set_rx_interrupt(enabled)
    }

    fn set_tx_interrupt(&self, enabled: bool) {
        (**self).set_tx_interrupt(enabled)
    }

    fn tx_interrupt_enabled(&self) -> bool {
        (**self).tx_interrupt_enabled()
    }
}

// ============================================================================
// Counters
// ============================================================================

/// Per-port error and overrun counters.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PmCounters)]
pub enum SerialPm {
    /// UART receiver overrun flag
    #[pm("uart rx overrun err")]
    UartOverrun,
    /// UART noise flag
    #[pm("uart rx noise err")]
    UartNoise,
    /// UART framing error flag
    #[pm("uart rx frame err")]
    UartFraming,
    /// UART parity error flag
    #[pm("uart rx parity err")]
    UartParity,
    /// Byte dropped because the transmit ring was full
    #[pm("tx buf overrun err")]
    TxBufOverrun,
    /// Byte dropped because the receive ring was full
    #[pm("rx buf overrun err")]
    RxBufOverrun,
}

/// Counter storage of one port.
pub type SerialCounters = Counters<{ SerialPm::COUNT }>;

// ============================================================================
// Port
// ============================================================================

/// One serial port: UART plus `RX`- and `TX`-slot rings.
pub struct Port<U, const RX: usize, const TX: usize> {
    uart: U,
    rx: RingBuffer<RX>,
    tx: RingBuffer<TX>,
    counters: SerialCounters,
    config: PortConfig,
    started: AtomicBool,
}

impl<U, const RX: usize, const TX: usize> fmt::Debug for Port<U, RX, TX> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Port")
            .field("rx", &self.rx)
            .field("tx", &self.tx)
            .field("config", &self.config)
            .finish()
    }
}

impl<U: Uart, const RX: usize, const TX: usize> Port<U, RX, TX> {
    /// Port over `uart`. Interrupts stay off until [`PortHandle::start`].
    pub const fn new(uart: U, config: PortConfig) -> Self {
        Self {
            uart,
            rx: RingBuffer::new(),
            tx: RingBuffer::new(),
            counters: Counters::new(SerialPm::NAMES),
            config,
            started: AtomicBool::new(false),
        }
    }

    /// Split into the main-loop handle, the interrupt half and a monitor.
    pub fn split(&mut self) -> (PortHandle<'_, U>, PortIrq<'_, U>, PortMonitor<'_>) {
        let (rx_in, rx_out) = self.rx.split();
        let (tx_in, tx_out) = self.tx.split();
        let monitor = PortMonitor {
            rx: rx_in.indices(),
            tx: tx_in.indices(),
            counters: &self.counters,
        };
        let handle = PortHandle {
            uart: &self.uart,
            tx: tx_in,
            rx: rx_out,
            counters: &self.counters,
            config: self.config,
            started: &self.started,
        };
        let irq = PortIrq {
            uart: &self.uart,
            rx: rx_in,
            tx: tx_out,
            counters: &self.counters,
        };
        (handle, irq, monitor)
    }
}

// ============================================================================
// Main-loop side
// ============================================================================

/// Main-loop end of a port.
pub struct PortHandle<'p, U> {
    uart: &'p U,
    tx: Producer<'p>,
    rx: Consumer<'p>,
    counters: &'p SerialCounters,
    config: PortConfig,
    started: &'p AtomicBool,
}

impl<U> fmt::Debug for PortHandle<'_, U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PortHandle")
            .field("tx", &self.tx)
            .field("rx", &self.rx)
            .field("started", &self.started.load(Ordering::Relaxed))
            .finish()
    }
}

impl<'p, U: Uart> PortHandle<'p, U> {
    /// Enable the receive interrupt, and the transmit interrupt if output was
    /// queued before starting.
    pub fn start(&mut self) {
        self.started.store(true, Ordering::Relaxed);
        self.uart.set_rx_interrupt(true);
        if !self.tx.is_empty() {
            self.arm_tx();
        }
    }

    /// True once [`start`](Self::start) has run.
    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Relaxed)
    }

    /// Queue one byte for transmission.
    ///
    /// A full ring drops the byte, counts it and returns
    /// [`Error::BufferOverrun`].
    pub fn put_byte(&mut self, byte: u8) -> Result<(), Error> {
        if !self.tx.push(byte) {
            self.counters.inc(SerialPm::TxBufOverrun);
            return Err(Error::BufferOverrun);
        }
        if self.is_started() {
            self.arm_tx();
        }
        Ok(())
    }

    /// Pop one received byte, if any.
    pub fn get_byte(&mut self) -> Option<u8> {
        self.rx.pop()
    }

    /// The port's policy flags.
    pub fn config(&self) -> PortConfig {
        self.config
    }

    /// The underlying UART.
    pub fn uart(&self) -> &'p U {
        self.uart
    }

    /// Read-only view sharing this port's indices and counters.
    pub fn monitor(&self) -> PortMonitor<'p> {
        PortMonitor {
            rx: self.rx.indices(),
            tx: self.tx.indices(),
            counters: self.counters,
        }
    }

    // The ISR disables TX when it finds the ring empty. Checking and
    // re-enabling must not interleave with that.
    fn arm_tx(&self) {
        critical_section::with(|_| {
            if !self.uart.tx_interrupt_enabled() {
                self.uart.set_tx_interrupt(true);
            }
        });
    }
}

impl<U: Uart> CharIo for PortHandle<'_, U> {
    type Error = Error;

    fn get_char(&mut self) -> Result<Option<u8>, Error> {
        Ok(self.get_byte())
    }

    fn put_char(&mut self, c: u8) -> Result<(), Error> {
        self.put_byte(c)
    }
}

/// Text output. Overruns are counted and otherwise ignored; with
/// `send_cr_after_nl` every `\n` is followed by `\r`.
impl<U: Uart> fmt::Write for PortHandle<'_, U> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for b in s.bytes() {
            self.put_byte(b).ok();
            if b == b'\n' && self.config.send_cr_after_nl {
                self.put_byte(b'\r').ok();
            }
        }
        Ok(())
    }
}

// ============================================================================
// Interrupt side
// ============================================================================

/// Interrupt-handler end of a port.
pub struct PortIrq<'p, U> {
    uart: &'p U,
    rx: Producer<'p>,
    tx: Consumer<'p>,
    counters: &'p SerialCounters,
}

impl<U> fmt::Debug for PortIrq<'_, U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PortIrq")
            .field("rx", &self.rx)
            .field("tx", &self.tx)
            .finish()
    }
}

impl<'p, U: Uart> PortIrq<'p, U> {
    /// Service the UART. Call from its interrupt handler.
    pub fn on_interrupt(&mut self) {
        let status = self.uart.status();
        let mut data_read = false;

        if status.contains(UartStatus::RX_READY) {
            let byte = self.uart.read_data();
            data_read = true;
            if !self.rx.push(byte) {
                self.counters.inc(SerialPm::RxBufOverrun);
            }
        }

        if status.contains(UartStatus::TX_READY) && self.uart.tx_interrupt_enabled() {
            match self.tx.pop() {
                Some(byte) => self.uart.write_data(byte),
                None => self.uart.set_tx_interrupt(false),
            }
        }

        let errors = status & UartStatus::ERRORS;
        if errors.is_empty() {
            return;
        }
        // Reading the data register clears the error flags.
        if !data_read {
            let _ = self.uart.read_data();
        }
        for (flag, pm) in [
            (UartStatus::OVERRUN, SerialPm::UartOverrun),
            (UartStatus::NOISE, SerialPm::UartNoise),
            (UartStatus::FRAMING, SerialPm::UartFraming),
            (UartStatus::PARITY, SerialPm::UartParity),
        ] {
            if errors.contains(flag) {
                self.counters.inc(pm);
            }
        }
    }

    /// The underlying UART.
    pub fn uart(&self) -> &'p U {
        self.uart
    }
}

// ============================================================================
// Monitor
// ============================================================================

/// Read-only diagnostics view of a port.
#[derive(Copy, Clone)]
pub struct PortMonitor<'p> {
    rx: RingIndices<'p>,
    tx: RingIndices<'p>,
    counters: &'p SerialCounters,
}

impl<'p> PortMonitor<'p> {
    /// Receive ring indices.
    pub fn rx(&self) -> RingIndices<'p> {
        self.rx
    }

    /// Transmit ring indices.
    pub fn tx(&self) -> RingIndices<'p> {
        self.tx
    }

    /// The port's counters.
    pub fn counters(&self) -> &'p SerialCounters {
        self.counters
    }

    /// Value of one counter.
    pub fn pm(&self, id: SerialPm) -> u16 {
        self.counters.get(id)
    }
}

impl fmt::Debug for PortMonitor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PortMonitor")
            .field("rx", &self.rx)
            .field("tx", &self.tx)
            .finish()
    }
}
