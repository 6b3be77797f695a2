//! Textual command sub-protocol (host to pad bridge).
//!
//! Commands are ASCII lines terminated by CR LF:
//!
//! ```text
//! AT+RST\r\n
//! AT+BAUD=115200\r\n
//! AT+BAUD?\r\n
//! ```
//!
//! Replies are a single line ending in `\n`. The baud query answers with a
//! decimal number.

use core::fmt::{self, Write};
use heapless::String;

/// Line terminator appended to every command.
pub const LINE_ENDING: &str = "\r\n";

/// Capacity of an encoded command line, terminator included.
pub const MAX_COMMAND_LEN: usize = 64;

/// An encoded command line ready for the wire.
pub type CommandLine = String<MAX_COMMAND_LEN>;

/// Link rates the bridge firmware implements.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BaudRate {
    B9600,
    B115200,
}

impl BaudRate {
    /// Map a numeric rate onto a supported one.
    #[must_use]
    pub const fn from_bps(bps: u32) -> Option<Self> {
        match bps {
            9_600 => Some(Self::B9600),
            115_200 => Some(Self::B115200),
            _ => None,
        }
    }

    /// Numeric rate in bits per second.
    #[must_use]
    pub const fn bps(self) -> u32 {
        match self {
            Self::B9600 => 9_600,
            Self::B115200 => 115_200,
        }
    }
}

/// A command understood by the pad bridge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AtCommand<'a> {
    /// `AT+RST`: software reset of the bridge.
    Reset,
    /// `AT+BAUD=<rate>`
    SetBaud(BaudRate),
    /// `AT+BAUD?`
    QueryBaud,
    /// Free-form command text, sent verbatim.
    Raw(&'a str),
}

impl fmt::Display for AtCommand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reset => f.write_str("AT+RST"),
            Self::SetBaud(rate) => write!(f, "AT+BAUD={}", rate.bps()),
            Self::QueryBaud => f.write_str("AT+BAUD?"),
            Self::Raw(text) => f.write_str(text),
        }
    }
}

/// Returned when a command does not fit in [`MAX_COMMAND_LEN`] bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CommandTooLong;

impl fmt::Display for CommandTooLong {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "command longer than {} bytes", MAX_COMMAND_LEN)
    }
}

impl AtCommand<'_> {
    /// Encode the command followed by CR LF.
    pub fn encode(&self) -> Result<CommandLine, CommandTooLong> {
        let mut line = CommandLine::new();
        write!(line, "{}{}", self, LINE_ENDING).map_err(|_| CommandTooLong)?;
        Ok(line)
    }
}

/// Strip any trailing CR and LF bytes.
#[inline]
#[must_use]
pub fn strip_line_ending(line: &[u8]) -> &[u8] {
    let end = line
        .iter()
        .rposition(|&b| b != b'\r' && b != b'\n')
        .map_or(0, |pos| pos + 1);
    &line[..end]
}

/// Parse the reply to `AT+BAUD?`.
///
/// Leading spaces and an optional `+` are accepted, parsing stops at the
/// first non-digit. Zero, negative, empty and overflowing replies yield `None`.
#[must_use]
pub fn parse_baud_reply(reply: &[u8]) -> Option<u32> {
    let start = reply
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(reply.len());
    let mut digits = &reply[start..];
    if let Some((&b'+', rest)) = digits.split_first() {
        digits = rest;
    }

    let mut value: u32 = 0;
    for &b in digits.iter().take_while(|b| b.is_ascii_digit()) {
        value = value.checked_mul(10)?.checked_add(u32::from(b - b'0'))?;
    }

    (value != 0).then_some(value)
}
