//! Client command metadata and the execution trait.
//!
//! A client describes its sub-commands with const [`CommandMeta`] tables and
//! implements [`CommandHandler`] once to run them. The engine matches the
//! typed name against the metadata and hands the handler the canonical name,
//! so handlers can dispatch with a plain `match`.

use core::fmt;

use crate::error::Error;

/// Name and help text of one sub-command.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CommandMeta {
    /// Sub-command name, matched case-insensitively
    pub name: &'static str,
    /// One-line help shown by `<client> help`
    pub help: &'static str,
}

impl CommandMeta {
    /// Const constructor for command tables.
    pub const fn new(name: &'static str, help: &'static str) -> Self {
        Self { name, help }
    }
}

/// Command execution handler trait.
/// Dispatches on the canonical sub-command name from the client's metadata.
pub trait CommandHandler {
    /// Run sub-command `cmd`.
    ///
    /// `args` is the whole token list, client and sub-command names included,
    /// so `args[2..]` are the user's arguments. Output goes to `out`.
    fn execute(&self, cmd: &str, out: &mut dyn fmt::Write, args: &[&str]) -> Result<(), Error>;
}
