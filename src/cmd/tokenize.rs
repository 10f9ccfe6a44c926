//! Command line tokenizer.

use core::fmt;

use crate::config::MAX_TOKENS;
use crate::error::Error;

/// Borrowed tokens of one command line.
pub type Tokens<'l> = heapless::Vec<&'l str, MAX_TOKENS>;

/// Token separators: ASCII whitespace plus vertical tab.
const fn is_separator(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | b'\x0b' | b'\x0c')
}

/// Split `line` on runs of whitespace. No quoting.
///
/// More than [`MAX_TOKENS`] tokens prints "Too many tokens" to `out` and fails
/// with [`Error::BadCommand`].
pub fn tokenize<'l>(line: &'l str, out: &mut dyn fmt::Write) -> Result<Tokens<'l>, Error> {
    let mut tokens = Tokens::new();
    for token in line
        .split(|c: char| c.is_ascii() && is_separator(c as u8))
        .filter(|t| !t.is_empty())
    {
        if tokens.push(token).is_err() {
            writeln!(out, "Too many tokens").ok();
            return Err(Error::BadCommand);
        }
    }
    Ok(tokens)
}
