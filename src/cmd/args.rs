//! Typed argument parsing for command handlers.
//!
//! The format string has one letter per expected argument:
//!
//! | Code | Value                                                  |
//! |------|--------------------------------------------------------|
//! | `i`  | signed integer, decimal, octal (`0` prefix) or hex (`0x`) |
//! | `u`  | unsigned integer, same bases                           |
//! | `p`  | pointer/address, always hex, `0x` optional             |
//! | `s`  | string, taken as is                                    |
//!
//! `[` marks the remaining arguments optional, but supplying one optional
//! argument makes every code after it mandatory again until the next `[`.
//! `]` is ignored and only there to balance brackets.
//!
//! | Format    | Accepts        |
//! |-----------|----------------|
//! | `"up"`    | exactly 2      |
//! | `"i[i]"`  | 1 or 2         |
//! | `"i[i[i"` | 1, 2 or 3      |
//! | `"i[ii]"` | 1 or 3         |

use core::fmt;

use crate::config::MAX_TOKENS;
use crate::error::Error;

/// One parsed argument.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ArgValue<'t> {
    /// `i`
    I(i32),
    /// `u`
    U(u32),
    /// `p`
    P(usize),
    /// `s`
    S(&'t str),
}

impl<'t> ArgValue<'t> {
    /// Signed value, if this is an `i` argument.
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            ArgValue::I(v) => Some(*v),
            _ => None,
        }
    }

    /// Unsigned value, if this is a `u` argument.
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            ArgValue::U(v) => Some(*v),
            _ => None,
        }
    }

    /// Address, if this is a `p` argument.
    pub fn as_addr(&self) -> Option<usize> {
        match self {
            ArgValue::P(v) => Some(*v),
            _ => None,
        }
    }

    /// String, if this is an `s` argument.
    pub fn as_str(&self) -> Option<&'t str> {
        match self {
            ArgValue::S(v) => Some(v),
            _ => None,
        }
    }
}

/// Parsed arguments; `len()` is the argument count.
pub type ArgValues<'t> = heapless::Vec<ArgValue<'t>, MAX_TOKENS>;

/// Parse `args` (the user's arguments only, not the client or command names)
/// against `fmt`.
///
/// Every failure prints a one-line diagnostic to `out`. Missing mandatory
/// arguments and leftover arguments are [`Error::BadCommand`]; a malformed
/// number or unknown format code is [`Error::Arg`].
pub fn parse_args<'t>(
    args: &[&'t str],
    fmt: &str,
    out: &mut dyn fmt::Write,
) -> Result<ArgValues<'t>, Error> {
    let mut values = ArgValues::new();
    let mut optional = false;

    for code in fmt.chars() {
        match code {
            '[' => {
                optional = true;
                continue;
            }
            ']' => continue,
            _ => {}
        }

        let Some(&arg) = args.get(values.len()) else {
            if optional {
                return Ok(values);
            }
            writeln!(out, "Insufficient arguments").ok();
            return Err(Error::BadCommand);
        };

        let value = match code {
            'i' => parse_i32(arg).map(ArgValue::I).ok_or("integer"),
            'u' => parse_u32(arg).map(ArgValue::U).ok_or("unsigned integer"),
            'p' => parse_addr(arg).map(ArgValue::P).ok_or("pointer"),
            's' => Ok(ArgValue::S(arg)),
            other => {
                writeln!(out, "Bad argument format '{}'", other).ok();
                return Err(Error::Arg);
            }
        };
        let value = match value {
            Ok(value) => value,
            Err(kind) => {
                writeln!(out, "Argument '{}' not a valid {}", arg, kind).ok();
                return Err(Error::Arg);
            }
        };

        if values.push(value).is_err() {
            writeln!(out, "Too many arguments").ok();
            return Err(Error::BadCommand);
        }
        optional = false;
    }

    if values.len() < args.len() {
        writeln!(out, "Too many arguments").ok();
        return Err(Error::BadCommand);
    }
    Ok(values)
}

// ============================================================================
// Number parsing
// ============================================================================

fn split_sign(token: &str) -> (bool, &str) {
    if let Some(rest) = token.strip_prefix('-') {
        (true, rest)
    } else {
        (false, token.strip_prefix('+').unwrap_or(token))
    }
}

fn digits(text: &str, radix: u32) -> Option<u64> {
    if text.is_empty() {
        return None;
    }
    let mut value: u64 = 0;
    for c in text.chars() {
        let digit = c.to_digit(radix)?;
        value = value
            .checked_mul(u64::from(radix))?
            .checked_add(u64::from(digit))?;
    }
    Some(value)
}

/// Magnitude with C-style base detection: `0x` hex, leading `0` octal,
/// otherwise decimal. The whole text must be consumed.
fn magnitude(text: &str) -> Option<u64> {
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        digits(hex, 16)
    } else if text.len() > 1 && text.starts_with('0') {
        digits(&text[1..], 8)
    } else {
        digits(text, 10)
    }
}

fn parse_i32(token: &str) -> Option<i32> {
    let (negative, text) = split_sign(token);
    let value = i64::try_from(magnitude(text)?).ok()?;
    i32::try_from(if negative { -value } else { value }).ok()
}

/// Negative input wraps, as the C library's unsigned conversion does.
fn parse_u32(token: &str) -> Option<u32> {
    let (negative, text) = split_sign(token);
    let value = u32::try_from(magnitude(text)?).ok()?;
    Some(if negative { value.wrapping_neg() } else { value })
}

fn parse_addr(token: &str) -> Option<usize> {
    let hex = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .unwrap_or(token);
    usize::try_from(digits(hex, 16)?).ok()
}
