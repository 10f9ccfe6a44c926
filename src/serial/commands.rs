//! `ttys` console client.
//!
//! `ttys status` prints each port's ring indices; `ttys pm` shows every port's
//! counters, labelled `port<n> <counter>`.

use core::fmt;

use super::{PortMonitor, SerialPm};
use crate::cmd::{Client, CommandHandler, CommandMeta};
use crate::error::Error;
use crate::logging::LevelCell;
use crate::log_debug;
use crate::pm::{CounterId, PerfCounters};

/// Client name.
pub const NAME: &str = "ttys";

/// Sub-command table.
pub const COMMANDS: &[CommandMeta] = &[CommandMeta::new(
    "status",
    "Get module status, usage: ttys status",
)];

/// Console handler over the monitors of all ports.
#[derive(Debug)]
pub struct SerialCommands<'a> {
    ports: &'a [PortMonitor<'a>],
    log_level: LevelCell,
}

impl<'a> SerialCommands<'a> {
    /// Handler over `ports`, numbered by position.
    pub fn new(ports: &'a [PortMonitor<'a>]) -> Self {
        Self {
            ports,
            log_level: LevelCell::default(),
        }
    }

    /// Log level of the serial module.
    pub fn log_level(&self) -> &LevelCell {
        &self.log_level
    }

    /// The `ttys` client, with log level and counters.
    pub fn client(&self) -> Client<'_> {
        Client::new(NAME, COMMANDS, self)
            .with_log_level(&self.log_level)
            .with_counters(self)
    }

    fn status(&self, out: &mut dyn fmt::Write) -> Result<(), Error> {
        log_debug!(self.log_level, "ttys status for {} ports", self.ports.len());
        for (idx, port) in self.ports.iter().enumerate() {
            let (tx, rx) = (port.tx(), port.rx());
            writeln!(out, "Instance {}:", idx).ok();
            writeln!(out, "  TX buffer: get_idx={} put_idx={}", tx.get(), tx.put()).ok();
            writeln!(out, "  RX buffer: get_idx={} put_idx={}", rx.get(), rx.put()).ok();
        }
        Ok(())
    }

    fn locate(&self, idx: usize) -> Option<(usize, &PortMonitor<'a>, usize)> {
        let port = idx / SerialPm::COUNT;
        self.ports
            .get(port)
            .map(|monitor| (port, monitor, idx % SerialPm::COUNT))
    }
}

impl CommandHandler for SerialCommands<'_> {
    fn execute(&self, cmd: &str, out: &mut dyn fmt::Write, _args: &[&str]) -> Result<(), Error> {
        match cmd {
            "status" => self.status(out),
            _ => Err(Error::BadCommand),
        }
    }
}

impl PerfCounters for SerialCommands<'_> {
    fn len(&self) -> usize {
        self.ports.len() * SerialPm::COUNT
    }

    fn label(&self, idx: usize, out: &mut dyn fmt::Write) -> fmt::Result {
        match self.locate(idx) {
            Some((port, _, counter)) => write!(out, "port{} {}", port, SerialPm::NAMES[counter]),
            None => out.write_str("?"),
        }
    }

    fn value(&self, idx: usize) -> u16 {
        self.locate(idx)
            .map(|(_, monitor, counter)| monitor.counters().value(counter))
            .unwrap_or(0)
    }

    fn clear(&self) {
        for port in self.ports {
            port.counters().clear();
        }
    }
}
