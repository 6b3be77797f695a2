//! Wire protocol for a PS2 gamepad bridged over a UART link.
//!
//! This crate holds everything that can be expressed without a transport
//! or a clock:
//!
//! - **Types**: [`Buttons`] (PS2 bit layout), [`Axis`], [`Sticks`], [`Vibrate`]
//! - **Framing**: [`FrameAssembler`], a byte-at-a-time state machine that
//!   recognises the start, end and disconnect sentinels
//! - **Decoding**: [`decode()`] turns a [`Frame`] into a [`PadReport`]
//! - **Commands**: [`AtCommand`] encoding and [`parse_baud_reply`] for the
//!   textual configuration sub-protocol
//!
//! # Protocol Format
//!
//! ## Pad state frame (bridge to host)
//!
//! ```text
//! 0x0D <buttonsHigh> <buttonsLow> <leftY> <leftX> <rightY> <rightX> 0x0A
//! ```
//!
//! No checksum. A single `0xAB` at any point means the bridge lost its pad;
//! framing resumes on the next `0x0D`.
//!
//! ## Vibration (host to bridge)
//!
//! One byte: `0x01` both motors, `0x02` left, `0x03` right.
//!
//! ## Commands (host to bridge)
//!
//! `AT+RST`, `AT+BAUD=<9600|115200>`, `AT+BAUD?`, each followed by CR LF.
//!
//! # Example
//!
//! ```
//! use ps2uart_proto::{decode, Buttons, FrameAssembler};
//!
//! let mut framer = FrameAssembler::new();
//! for &byte in &[0x0D, 0x00, 0x10, 0x7F, 0x80, 0x7F, 0x80, 0x0A] {
//!     if framer.push(byte) {
//!         break;
//!     }
//! }
//!
//! let frame = framer.take_frame().unwrap();
//! let report = decode(&frame);
//! assert_eq!(report.buttons, Buttons::PAD_UP);
//! assert_eq!(report.sticks.left_x, 0x80);
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting (for embedded logging)
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

pub mod at;
pub mod decode;
pub mod frame;
pub mod types;

// Re-export at crate root for convenience
pub use at::{
    parse_baud_reply, strip_line_ending, AtCommand, BaudRate, CommandLine, CommandTooLong,
    LINE_ENDING, MAX_COMMAND_LEN,
};
pub use decode::{decode, decode_bytes, PadReport};
pub use frame::{
    Frame, FrameAssembler, FramerState, DISCONNECT_BYTE, END_BYTE, FRAME_BUFFER_LEN, PAYLOAD_LEN,
    START_BYTE,
};
pub use types::{Axis, Buttons, Sticks, Vibrate};
