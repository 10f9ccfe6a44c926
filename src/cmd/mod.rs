//! Command registry and dispatch engine.
//!
//! Modules register one [`Client`] each at startup: a name, a table of
//! sub-commands with a [`CommandHandler`], and optionally a log level cell and
//! a set of performance counters. The console passes complete lines to
//! [`Registry::execute`]:
//!
//! ```text
//! <client> <subcommand> [args...]
//! <client> help|?
//! <client> log [level]
//! <client> pm [clear]
//! help|?
//! * log [level]
//! ```
//!
//! The `log`, `pm` and `help` forms are served by the engine itself. Every
//! token is matched ignoring ASCII case.

use core::fmt;

use crate::error::Error;
use crate::logging::{LevelCell, LogLevel, LEVEL_NAMES};
use crate::pm::PerfCounters;
use crate::{log_debug, log_error};

mod args;
mod handler;
mod tokenize;

pub use args::{parse_args, ArgValue, ArgValues};
pub use handler::{CommandHandler, CommandMeta};
pub use tokenize::{tokenize, Tokens};

// ============================================================================
// Client
// ============================================================================

/// A module's registration with the engine.
///
/// The engine keeps a reference, so the client and everything it points to
/// must outlive the registry.
#[derive(Copy, Clone)]
pub struct Client<'a> {
    name: &'static str,
    commands: &'a [CommandMeta],
    handler: &'a dyn CommandHandler,
    log_level: Option<&'a LevelCell>,
    counters: Option<&'a dyn PerfCounters>,
}

impl<'a> Client<'a> {
    /// Client `name` serving `commands` through `handler`.
    pub const fn new(
        name: &'static str,
        commands: &'a [CommandMeta],
        handler: &'a dyn CommandHandler,
    ) -> Self {
        Self {
            name,
            commands,
            handler,
            log_level: None,
            counters: None,
        }
    }

    /// Expose the module's log level through `<client> log`.
    pub const fn with_log_level(mut self, level: &'a LevelCell) -> Self {
        self.log_level = Some(level);
        self
    }

    /// Expose the module's counters through `<client> pm`.
    pub const fn with_counters(mut self, counters: &'a dyn PerfCounters) -> Self {
        self.counters = Some(counters);
        self
    }

    /// Registered name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Sub-command table.
    pub fn commands(&self) -> &'a [CommandMeta] {
        self.commands
    }

    /// Log level cell, if exposed.
    pub fn log_level(&self) -> Option<&'a LevelCell> {
        self.log_level
    }

    fn pms(&self) -> Option<&'a dyn PerfCounters> {
        self.counters.filter(|c| !c.is_empty())
    }

    fn command(&self, name: &str) -> Option<&'a CommandMeta> {
        self.commands
            .iter()
            .find(|meta| meta.name.eq_ignore_ascii_case(name))
    }
}

impl fmt::Debug for Client<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("name", &self.name)
            .field("commands", &self.commands)
            .field("log_level", &self.log_level.map(LevelCell::get))
            .field("pm", &self.counters.map(|c| c.len()))
            .finish()
    }
}

// ============================================================================
// Registry
// ============================================================================

fn is_help(token: &str) -> bool {
    token == "?" || token.eq_ignore_ascii_case("help")
}

/// Fixed-capacity client registry and line dispatcher.
pub struct Registry<'a, const MAX: usize> {
    clients: heapless::Vec<&'a Client<'a>, MAX>,
    log_level: LevelCell,
}

impl<const MAX: usize> fmt::Debug for Registry<'_, MAX> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clients.iter()).finish()
    }
}

impl<const MAX: usize> Default for Registry<'_, MAX> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, const MAX: usize> Registry<'a, MAX> {
    /// Empty registry.
    pub const fn new() -> Self {
        Self {
            clients: heapless::Vec::new(),
            log_level: LevelCell::new(LogLevel::DEFAULT),
        }
    }

    /// The engine's own log level.
    pub fn log_level(&self) -> &LevelCell {
        &self.log_level
    }

    /// Number of registered clients.
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Look up a client by name, ignoring case.
    pub fn find(&self, name: &str) -> Option<&'a Client<'a>> {
        self.clients
            .iter()
            .copied()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Add `client`, replacing any client of the same name.
    ///
    /// Fails with [`Error::Resource`] only when the registry is full and the
    /// name is new.
    pub fn register(&mut self, client: &'a Client<'a>) -> Result<(), Error> {
        if let Some(slot) = self
            .clients
            .iter_mut()
            .find(|c| c.name.eq_ignore_ascii_case(client.name))
        {
            *slot = client;
            return Ok(());
        }
        self.clients.push(client).map_err(|_| {
            log_error!(self.log_level, "No room for client {}", client.name);
            Error::Resource
        })
    }

    /// Tokenize and run one command line, writing all output to `out`.
    ///
    /// An empty line does nothing. Handler results are passed through.
    pub fn execute(&self, line: &str, out: &mut dyn fmt::Write) -> Result<(), Error> {
        let tokens = tokenize(line, out)?;
        let Some(&first) = tokens.first() else {
            return Ok(());
        };

        if first == "*" {
            return self.wildcard(&tokens, out);
        }
        if is_help(first) {
            self.help_all(out);
            return Ok(());
        }

        match self.find(first) {
            Some(client) => self.client_command(client, &tokens, out),
            None => {
                writeln!(out, "No such command ({})", first).ok();
                Err(Error::BadCommand)
            }
        }
    }

    fn wildcard(&self, tokens: &[&str], out: &mut dyn fmt::Write) -> Result<(), Error> {
        let Some(&cmd) = tokens.get(1) else {
            writeln!(out, "Wildcard missing command").ok();
            return Err(Error::BadCommand);
        };
        if !cmd.eq_ignore_ascii_case("log") || tokens.len() > 3 {
            writeln!(out, "Invalid arguments").ok();
            return Err(Error::Arg);
        }

        let new_level = match tokens.get(2) {
            Some(&name) => Some(parse_level(name, out)?),
            None => None,
        };
        for client in self.clients.iter() {
            let Some(cell) = client.log_level else {
                continue;
            };
            match new_level {
                Some(level) => cell.set(level),
                None => {
                    writeln!(out, "Log level for {} = {}", client.name, cell.get().as_str()).ok();
                }
            }
        }
        Ok(())
    }

    fn help_all(&self, out: &mut dyn fmt::Write) {
        for client in self.clients.iter() {
            write!(out, "{} (", client.name).ok();
            let mut sep = "";
            for meta in client.commands {
                write!(out, "{}{}", sep, meta.name).ok();
                sep = ", ";
            }
            if client.log_level.is_some() {
                write!(out, "{}log", sep).ok();
                sep = ", ";
            }
            if client.pms().is_some() {
                write!(out, "{}pm", sep).ok();
            }
            writeln!(out, ")").ok();
        }
        writeln!(out, "\nLog levels are: {}", LEVEL_NAMES).ok();
    }

    fn client_help(&self, client: &Client<'_>, out: &mut dyn fmt::Write) {
        log_debug!(self.log_level, "Handle client help");
        for meta in client.commands {
            writeln!(out, "{} {}: {}", client.name, meta.name, meta.help).ok();
        }
        if client.log_level.is_some() {
            writeln!(out, "{} log: set or get log level, args: [level]", client.name).ok();
        }
        if client.pms().is_some() {
            writeln!(
                out,
                "{} pm: get or clear performance measurements, args: [clear]",
                client.name
            )
            .ok();
        }
        if client.log_level.is_some() {
            writeln!(out, "\nLog levels are: {}", LEVEL_NAMES).ok();
        }
    }

    fn client_command(
        &self,
        client: &Client<'_>,
        tokens: &[&str],
        out: &mut dyn fmt::Write,
    ) -> Result<(), Error> {
        let Some(&sub) = tokens.get(1) else {
            writeln!(out, "No such command ({})", tokens[0]).ok();
            return Err(Error::BadCommand);
        };

        if is_help(sub) {
            self.client_help(client, out);
            return Ok(());
        }

        // Without the capability, `log` and `pm` are ordinary sub-command
        // names, so help never lists something that cannot run.
        if sub.eq_ignore_ascii_case("log") {
            if let Some(cell) = client.log_level {
                log_debug!(self.log_level, "Handle command log");
                match tokens.get(2) {
                    Some(&name) => cell.set(parse_level(name, out)?),
                    None => {
                        writeln!(out, "Log level for {} = {}", client.name, cell.get().as_str())
                            .ok();
                    }
                }
                return Ok(());
            }
        }

        if sub.eq_ignore_ascii_case("pm") {
            if let Some(pms) = client.pms() {
                return pm_command(client.name, pms, tokens.get(2).copied(), out);
            }
        }

        match client.command(sub) {
            Some(meta) => {
                log_debug!(self.log_level, "Handle command {} {}", client.name, meta.name);
                client.handler.execute(meta.name, out, tokens)
            }
            None => {
                writeln!(out, "No such command ({} {})", tokens[0], sub).ok();
                Err(Error::BadCommand)
            }
        }
    }
}

fn parse_level(name: &str, out: &mut dyn fmt::Write) -> Result<LogLevel, Error> {
    LogLevel::from_name(name).ok_or_else(|| {
        writeln!(out, "Invalid log level: {}", name).ok();
        Error::Arg
    })
}

fn pm_command(
    name: &str,
    pms: &dyn PerfCounters,
    arg: Option<&str>,
    out: &mut dyn fmt::Write,
) -> Result<(), Error> {
    // Only `clear` is special; any other argument shows the report.
    if arg.is_some_and(|arg| arg.eq_ignore_ascii_case("clear")) {
        writeln!(out, "Clearing performance measurements for {}", name).ok();
        pms.clear();
        return Ok(());
    }
    writeln!(out, "{}:", name).ok();
    for idx in 0..pms.len() {
        out.write_str("  ").ok();
        pms.label(idx, out).ok();
        writeln!(out, ": {}", pms.value(idx)).ok();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pm::{CounterId, Counters};
    use crate::PmCounters;
    extern crate std;
    use std::string::String;

    const COMMANDS: &[CommandMeta] = &[
        CommandMeta::new("status", "Get module status, usage: demo status"),
        CommandMeta::new("test", "Run test, usage: demo test <n>"),
    ];

    struct Demo;

    impl CommandHandler for Demo {
        fn execute(&self, cmd: &str, out: &mut dyn fmt::Write, args: &[&str]) -> Result<(), Error> {
            match cmd {
                "status" => {
                    writeln!(out, "ok").ok();
                    Ok(())
                }
                "test" => {
                    let values = parse_args(&args[2..], "u", out)?;
                    writeln!(out, "n={}", values[0].as_u32().unwrap_or(0)).ok();
                    Ok(())
                }
                _ => Err(Error::BadCommand),
            }
        }
    }

    fn run<const N: usize>(registry: &Registry<'_, N>, line: &str) -> (Result<(), Error>, String) {
        let mut out = String::new();
        let result = registry.execute(line, &mut out);
        (result, out)
    }

    #[test]
    fn test_dispatch_is_case_insensitive() {
        let client = Client::new("demo", COMMANDS, &Demo);
        let mut registry: Registry<'_, 2> = Registry::new();
        registry.register(&client).unwrap();

        assert_eq!(run(&registry, "DEMO Status"), (Ok(()), String::from("ok\n")));
        assert_eq!(run(&registry, "demo test 0x10"), (Ok(()), String::from("n=16\n")));
    }

    #[test]
    fn test_handler_error_is_returned() {
        let client = Client::new("demo", COMMANDS, &Demo);
        let mut registry: Registry<'_, 2> = Registry::new();
        registry.register(&client).unwrap();

        let (result, out) = run(&registry, "demo test zz");
        assert_eq!(result, Err(Error::Arg));
        assert_eq!(out, "Argument 'zz' not a valid unsigned integer\n");
    }

    #[test]
    fn test_register_replaces_and_fills() {
        let a = Client::new("a", COMMANDS, &Demo);
        let a2 = Client::new("A", &[], &Demo);
        let b = Client::new("b", COMMANDS, &Demo);
        let c = Client::new("c", COMMANDS, &Demo);
        let mut registry: Registry<'_, 2> = Registry::new();

        registry.register(&a).unwrap();
        registry.register(&a2).unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.find("a").unwrap().commands().is_empty());

        registry.register(&b).unwrap();
        assert_eq!(registry.register(&c), Err(Error::Resource));
        assert_eq!(registry.register(&b), Ok(()));
    }

    #[derive(Copy, Clone, PmCounters)]
    enum DemoPm {
        RxErr,
        TxErr,
    }

    #[test]
    fn test_pm_report_and_clear() {
        let pms: Counters<{ DemoPm::COUNT }> = Counters::new(DemoPm::NAMES);
        pms.inc(DemoPm::TxErr);

        let client = Client::new("demo", COMMANDS, &Demo).with_counters(&pms);
        let mut registry: Registry<'_, 1> = Registry::new();
        registry.register(&client).unwrap();

        let (_, out) = run(&registry, "demo pm");
        assert_eq!(out, "demo:\n  rx err: 0\n  tx err: 1\n");

        let (_, out) = run(&registry, "demo PM Clear");
        assert_eq!(out, "Clearing performance measurements for demo\n");
        assert_eq!(pms.get(DemoPm::TxErr), 0);
    }

    #[test]
    fn test_pm_unknown_argument_reports() {
        let pms: Counters<{ DemoPm::COUNT }> = Counters::new(DemoPm::NAMES);
        pms.inc(DemoPm::RxErr);

        let client = Client::new("demo", COMMANDS, &Demo).with_counters(&pms);
        let mut registry: Registry<'_, 1> = Registry::new();
        registry.register(&client).unwrap();

        assert_eq!(
            run(&registry, "demo pm show"),
            (Ok(()), String::from("demo:\n  rx err: 1\n  tx err: 0\n"))
        );
        assert_eq!(pms.get(DemoPm::RxErr), 1);
    }

    #[test]
    fn test_log_without_cell_falls_through() {
        let client = Client::new("demo", COMMANDS, &Demo);
        let mut registry: Registry<'_, 1> = Registry::new();
        registry.register(&client).unwrap();

        let (result, out) = run(&registry, "demo log");
        assert_eq!(result, Err(Error::BadCommand));
        assert_eq!(out, "No such command (demo log)\n");
    }

    #[test]
    fn test_wildcard_errors() {
        let registry: Registry<'_, 1> = Registry::new();
        assert_eq!(
            run(&registry, "*"),
            (Err(Error::BadCommand), String::from("Wildcard missing command\n"))
        );
        assert_eq!(run(&registry, "* pm").0, Err(Error::Arg));
        assert_eq!(run(&registry, "* log debug extra").0, Err(Error::Arg));
        assert_eq!(
            run(&registry, "* log loud"),
            (Err(Error::Arg), String::from("Invalid log level: loud\n"))
        );
    }

    #[test]
    fn test_empty_line_is_silent() {
        let registry: Registry<'_, 1> = Registry::new();
        assert_eq!(run(&registry, " \t "), (Ok(()), String::new()));
    }

    #[test]
    fn test_client_without_subcommand() {
        let client = Client::new("demo", COMMANDS, &Demo);
        let mut registry: Registry<'_, 1> = Registry::new();
        registry.register(&client).unwrap();
        assert_eq!(
            run(&registry, "demo"),
            (Err(Error::BadCommand), String::from("No such command (demo)\n"))
        );
    }
}
