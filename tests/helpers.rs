//! Shared test helpers to reduce duplication across integration tests.

#![allow(dead_code)]

#[allow(clippy::duplicate_mod)]
#[path = "fixtures/mod.rs"]
pub mod fixtures;

use fixtures::MockUart;
use superloop::{Clock, Error, PortIrq, Registry, UartStatus};

// ============================================================================
// Clock helpers
// ============================================================================

/// Advance `clock` by `ms` ticks.
pub fn advance(clock: &Clock, ms: u32) {
    for _ in 0..ms {
        clock.tick();
    }
}

// ============================================================================
// Command helpers
// ============================================================================

/// Run one command line and capture its output.
pub fn execute<const N: usize>(registry: &Registry<'_, N>, line: &str) -> (Result<(), Error>, String) {
    let mut out = String::new();
    let result = registry.execute(line, &mut out);
    (result, out)
}

// ============================================================================
// Serial helpers
// ============================================================================

/// Take transmit interrupts until the ISR disables TX (ring drained).
///
/// Returns the number of interrupts taken.
pub fn pump_tx(irq: &mut PortIrq<'_, &MockUart>, uart: &MockUart) -> usize {
    let mut taken = 0;
    while uart.tx_enabled() {
        assert!(taken < 100_000, "transmit interrupt never went idle");
        uart.set_status(UartStatus::TX_READY);
        irq.on_interrupt();
        taken += 1;
    }
    uart.set_status(UartStatus::empty());
    taken
}

/// Deliver `bytes` one receive interrupt at a time.
pub fn receive(irq: &mut PortIrq<'_, &MockUart>, uart: &MockUart, bytes: &[u8]) {
    for &b in bytes {
        uart.latch_rx(b, UartStatus::empty());
        irq.on_interrupt();
    }
    uart.set_status(UartStatus::empty());
}

// ============================================================================
// Assertions
// ============================================================================

/// Assert output contains all expected strings.
pub fn assert_contains_all(output: &str, expected: &[&str]) {
    for exp in expected {
        assert!(
            output.contains(exp),
            "Expected '{}' in output, got: {}",
            exp,
            output
        );
    }
}

/// Assert output contains none of the forbidden strings.
pub fn assert_contains_none(output: &str, forbidden: &[&str]) {
    for f in forbidden {
        assert!(
            !output.contains(f),
            "Did not expect '{}' in output, got: {}",
            f,
            output
        );
    }
}
